use crate::product::Product;
use crate::ui::table::truncate_str;
use unicode_width::UnicodeWidthStr;

const NAME_WIDTH: usize = 32;
const CATEGORY_WIDTH: usize = 24;

fn pad(s: &str, width: usize) -> String {
    let s = truncate_str(s, width);
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}

/// Plain-text table for `catalog-browser list`.
pub fn format_table(products: &[Product]) -> String {
    let id_width = products
        .iter()
        .filter_map(|p| p.id.as_ref())
        .map(|id| id.as_str().width())
        .max()
        .unwrap_or(0)
        .max(2);

    let mut out = format!(
        "{}  {}  {}  {:>10}  {}\n",
        pad("ID", id_width),
        pad("NAME", NAME_WIDTH),
        pad("CATEGORY", CATEGORY_WIDTH),
        "PRICE",
        "IMAGE"
    );
    for p in products {
        let id = p.id.as_ref().map(|id| id.as_str()).unwrap_or("");
        out.push_str(&format!(
            "{}  {}  {}  {:>10}  {}\n",
            pad(id, id_width),
            pad(&p.name, NAME_WIDTH),
            pad(&p.category, CATEGORY_WIDTH),
            p.price_label(),
            p.image
        ));
    }
    out
}

/// Key/value listing for `catalog-browser show`.
pub fn format_product(product: &Product) -> String {
    let id = product.id.as_ref().map(|id| id.as_str()).unwrap_or("");
    format!(
        "Name:     {}\nID:       {}\nCategory: {}\nPrice:    {}\nImage:    {}\n",
        product.name,
        id,
        product.category,
        product.price_label(),
        product.image
    )
}

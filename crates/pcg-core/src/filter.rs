//! Product and target exclusion.

use pcg_schema::{Product, Target};

/// Remove excluded products and targets from one version's manifest facts.
///
/// Products lose references to targets that are no longer declared, and a
/// product left without targets is dropped. Names that match nothing are
/// ignored.
pub fn apply_exclusions(
    targets: Vec<Target>,
    products: Vec<Product>,
    excluded_products: &[String],
    excluded_targets: &[String],
) -> (Vec<Target>, Vec<Product>) {
    let targets: Vec<Target> = targets
        .into_iter()
        .filter(|t| !excluded_targets.contains(&t.name))
        .collect();

    let products = products
        .into_iter()
        .filter(|p| !excluded_products.contains(&p.name))
        .filter_map(|mut product| {
            product
                .targets
                .retain(|name| targets.iter().any(|t| &t.name == name));
            if product.targets.is_empty() {
                tracing::debug!("dropping product {} with no remaining targets", product.name);
                None
            } else {
                Some(product)
            }
        })
        .collect();

    (targets, products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcg_schema::{LibraryType, ProductType};

    fn fixture() -> (Vec<Target>, Vec<Product>) {
        let lib = ProductType::Library(LibraryType::Automatic);
        (
            vec![
                Target::new("Foo", Some("Foo".into())),
                Target::new("Bar", Some("Bar".into())),
            ],
            vec![
                Product::new("Foo", lib, vec!["Foo".into()]),
                Product::new("Bar", lib, vec!["Bar".into()]),
                Product::new("Both", lib, vec!["Foo".into(), "Bar".into()]),
            ],
        )
    }

    fn target_names(targets: &[Target]) -> Vec<&str> {
        targets.iter().map(|t| t.name.as_str()).collect()
    }

    fn product_names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn excluding_unknown_names_is_a_no_op() {
        let (targets, products) = fixture();
        let (t, p) = apply_exclusions(
            targets.clone(),
            products.clone(),
            &["Nope".into()],
            &["Missing".into()],
        );
        assert_eq!(t, targets);
        assert_eq!(p, products);
    }

    #[test]
    fn excluding_a_target_drops_products_left_empty() {
        let (targets, products) = fixture();
        let (t, p) = apply_exclusions(targets, products, &[], &["Bar".into()]);
        assert_eq!(target_names(&t), ["Foo"]);
        assert_eq!(product_names(&p), ["Foo", "Both"]);
        assert_eq!(p[1].targets, ["Foo"]);
    }

    #[test]
    fn excluding_a_product_keeps_its_targets() {
        let (targets, products) = fixture();
        let (t, p) = apply_exclusions(targets, products, &["Foo".into()], &[]);
        assert_eq!(t.len(), 2);
        assert_eq!(product_names(&p), ["Bar", "Both"]);
    }
}

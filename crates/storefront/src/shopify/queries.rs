//! GraphQL documents for the Shopify Storefront API.

/// Fields every listing needs from a product.
const PRODUCT_FIELDS: &str = r"
fragment ListingProductFields on Product {
  id
  handle
  title
  vendor
  tags
  availableForSale
  createdAt
  priceRange {
    minVariantPrice { amount currencyCode }
    maxVariantPrice { amount currencyCode }
  }
  options(first: 10) {
    name
    optionValues { name }
  }
  variants(first: 100) {
    nodes {
      id
      title
      availableForSale
      selectedOptions { name value }
      price { amount currencyCode }
    }
  }
}
";

const COLLECTION_PRODUCTS_QUERY: &str = r"
query CollectionProducts(
  $handle: String!
  $first: Int
  $last: Int
  $after: String
  $before: String
  $sortKey: ProductCollectionSortKeys
  $reverse: Boolean
  $filters: [ProductFilter!]
) {
  collection(handle: $handle) {
    handle
    title
    products(
      first: $first
      last: $last
      after: $after
      before: $before
      sortKey: $sortKey
      reverse: $reverse
      filters: $filters
    ) {
      pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
      nodes { ...ListingProductFields }
    }
  }
}
";

/// Products in best-selling order, so position doubles as sales rank.
const CATALOG_PRODUCTS_QUERY: &str = r"
query CatalogProducts($first: Int!, $after: String) {
  products(first: $first, after: $after, sortKey: BEST_SELLING) {
    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
    nodes { ...ListingProductFields }
  }
}
";

/// Filtered, sorted page of a collection.
pub fn collection_products() -> String {
    format!("{COLLECTION_PRODUCTS_QUERY}{PRODUCT_FIELDS}")
}

/// One batch of the whole catalog.
pub fn catalog_products() -> String {
    format!("{CATALOG_PRODUCTS_QUERY}{PRODUCT_FIELDS}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_include_fragment() {
        for document in [collection_products(), catalog_products()] {
            assert!(document.contains("...ListingProductFields"));
            assert!(document.contains("fragment ListingProductFields on Product"));
        }
    }
}

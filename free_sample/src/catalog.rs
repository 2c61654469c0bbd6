//! Catalog products and the `free-sample` tag.

use serde::{Deserialize, Serialize};

use crate::scalars::{Handle, ID, URL};

/// Product tag that makes a product eligible to be offered as a sample.
pub const SAMPLE_TAG: &str = "free-sample";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub product_id: ID,
    pub title: String,
    pub handle: Handle,
    pub image_url: Option<URL>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Default variant; sample lines are added for this variant.
    pub variant_id: ID,
}

impl CatalogProduct {
    pub fn is_sample_eligible(&self) -> bool {
        self.tags.iter().any(|tag| is_sample_tag(tag))
    }
}

/// Tag comparison ignores ASCII case and surrounding whitespace.
pub fn is_sample_tag(tag: &str) -> bool {
    tag.trim().eq_ignore_ascii_case(SAMPLE_TAG)
}

/// Returns the tag list with the sample tag added or removed. Adding is a
/// no-op when any spelling of the tag is already present; removing drops
/// every spelling of it. Other tags keep their order.
pub fn with_sample_tag(tags: &[String], enabled: bool) -> Vec<String> {
    let mut tags: Vec<String> = tags
        .iter()
        .filter(|tag| enabled || !is_sample_tag(tag))
        .cloned()
        .collect();
    if enabled && !tags.iter().any(|tag| is_sample_tag(tag)) {
        tags.push(SAMPLE_TAG.to_string());
    }
    tags
}

/// Filters a catalog down to sample-eligible products, keeping catalog order.
pub fn eligible_products<I>(catalog: I) -> Vec<CatalogProduct>
where
    I: IntoIterator<Item = CatalogProduct>,
{
    catalog
        .into_iter()
        .filter(CatalogProduct::is_sample_eligible)
        .collect()
}

//! Document metadata (`info.json`)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Size of a page in document points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    /// Per-page overrides keyed by 1-indexed page number
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exceptions: BTreeMap<String, PageSize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub pagenum: usize,
}

/// A hyperlink as listed in the metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    /// Page the link sits on (1-indexed)
    pub pagenum: usize,
    /// `[x0, y0, x1, y1]` in document points
    pub bbox: [f64; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub numpages: usize,
    pub dimensions: Dimensions,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<serde_json::Value>,
}

impl DocumentMetadata {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Size of the given 1-indexed page, honoring exceptions
    pub fn page_size(&self, page: usize) -> PageSize {
        self.dimensions
            .exceptions
            .get(&page.to_string())
            .copied()
            .unwrap_or(PageSize {
                width: self.dimensions.width,
                height: self.dimensions.height,
            })
    }
}

/// Distribute links onto their pages.
///
/// Returns one list per document page (index 0 = page 1). Links on pages
/// outside the document are dropped, as are internal links whose destination
/// falls outside the displayed `[page_start, page_end]` range (1-indexed).
pub fn sort_page_links(
    links: &[LinkSpec],
    num_pages: usize,
    page_start: usize,
    page_end: usize,
) -> Vec<Vec<LinkSpec>> {
    let mut sorted = vec![Vec::new(); num_pages];

    for link in links {
        if link.pagenum < 1 || link.pagenum > num_pages {
            continue;
        }
        if let Some(destination) = link.destination {
            if destination.pagenum < page_start || destination.pagenum > page_end {
                continue;
            }
        }
        sorted[link.pagenum - 1].push(link.clone());
    }

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn internal_link(pagenum: usize, destination: usize) -> LinkSpec {
        LinkSpec {
            pagenum,
            bbox: [0.0, 0.0, 10.0, 10.0],
            uri: None,
            destination: Some(Destination {
                pagenum: destination,
            }),
        }
    }

    #[test]
    fn parses_info_json_with_exceptions() {
        let json = br#"{
            "numpages": 3,
            "dimensions": {"width": 612, "height": 792, "exceptions": {"2": {"width": 792, "height": 612}}},
            "links": [{"pagenum": 1, "bbox": [1, 2, 3, 4], "uri": "https://example.com"}],
            "version": "1.0"
        }"#;

        let metadata = DocumentMetadata::from_slice(json).unwrap();

        assert_eq!(metadata.numpages, 3);
        assert_eq!(metadata.page_size(1).width, 612.0);
        assert_eq!(metadata.page_size(2).width, 792.0);
        assert_eq!(metadata.links[0].uri.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn links_land_on_their_pages() {
        let links = vec![internal_link(1, 2), internal_link(2, 1)];

        let sorted = sort_page_links(&links, 5, 1, 5);

        assert_eq!(sorted.len(), 5);
        assert_eq!(sorted[0].len(), 1);
        assert_eq!(sorted[0][0].destination, Some(Destination { pagenum: 2 }));
        assert_eq!(sorted[1].len(), 1);
        assert_eq!(sorted[1][0].destination, Some(Destination { pagenum: 1 }));
        assert!(sorted[2..].iter().all(Vec::is_empty));
    }

    #[test]
    fn links_outside_range_are_dropped() {
        let links = vec![internal_link(2, 5), internal_link(9, 1), internal_link(2, 2)];

        let sorted = sort_page_links(&links, 5, 2, 3);

        assert_eq!(sorted[1].len(), 1);
        assert_eq!(sorted[1][0].destination, Some(Destination { pagenum: 2 }));
    }
}

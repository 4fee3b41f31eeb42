//! Cell hyperlinks

/// Where a hyperlink points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HyperlinkTarget {
    /// External address (URL, mailto:, file path)
    Url(String),
    /// Location inside the workbook, e.g. `Sheet2!A1`
    Location(String),
}

/// A hyperlink attached to a single cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    pub target: HyperlinkTarget,
    pub tooltip: Option<String>,
}

impl Hyperlink {
    /// Link to an external address
    pub fn url<S: Into<String>>(url: S) -> Self {
        Self {
            target: HyperlinkTarget::Url(url.into()),
            tooltip: None,
        }
    }

    /// Link to a location in the same workbook
    pub fn location<S: Into<String>>(location: S) -> Self {
        Self {
            target: HyperlinkTarget::Location(location.into()),
            tooltip: None,
        }
    }

    /// Set the tooltip shown on hover
    pub fn with_tooltip<S: Into<String>>(mut self, tooltip: S) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// The external address, if this is a URL link
    pub fn as_url(&self) -> Option<&str> {
        match &self.target {
            HyperlinkTarget::Url(url) => Some(url),
            HyperlinkTarget::Location(_) => None,
        }
    }
}

use crate::types::{is_resolved, Link};

pub const SIGNATURE_PLACEHOLDER: &str = "{signature}";
pub const MINT_PLACEHOLDER: &str = "{mint}";

/// A labelled URL template containing `{signature}` and/or `{mint}` markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTemplate {
    pub label: String,
    pub template: String,
}

impl LinkTemplate {
    pub fn new(label: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            template: template.into(),
        }
    }

    /// Fills every placeholder occurrence in a single pass over the template.
    ///
    /// Substituted values are percent-encoded and never rescanned. Returns
    /// `None` when the template is blank or references a value that is not
    /// resolvable, so a link is never emitted half-rendered.
    pub fn fill(&self, signature: &str, mint: &str) -> Option<Link> {
        if self.template.trim().is_empty() {
            return None;
        }

        let mut url = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find('{') {
            url.push_str(&rest[..start]);
            let tail = &rest[start..];
            let substitution = [(SIGNATURE_PLACEHOLDER, signature), (MINT_PLACEHOLDER, mint)]
                .into_iter()
                .find(|(placeholder, _)| tail.starts_with(placeholder));

            match substitution {
                Some((placeholder, value)) => {
                    if !is_resolved(value) {
                        return None;
                    }
                    url.push_str(&urlencoding::encode(value));
                    rest = &tail[placeholder.len()..];
                }
                None => {
                    url.push('{');
                    rest = &tail[1..];
                }
            }
        }
        url.push_str(rest);

        Some(Link::new(self.label.clone(), url))
    }
}

/// Maps a signature and mint to the ordered list of reference links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    explorer: LinkTemplate,
    extras: Vec<LinkTemplate>,
}

impl LinkBuilder {
    /// Creates a builder whose only link is the transaction explorer.
    pub fn new(explorer_template: impl Into<String>) -> Self {
        Self {
            explorer: LinkTemplate::new("Tx", explorer_template),
            extras: Vec::new(),
        }
    }

    /// Appends an optional template; absent or blank templates are ignored.
    pub fn with_template(mut self, label: impl Into<String>, template: Option<&str>) -> Self {
        if let Some(template) = template.filter(|value| !value.trim().is_empty()) {
            self.extras.push(LinkTemplate::new(label, template));
        }
        self
    }

    pub fn build(&self, signature: &str, mint: &str) -> Vec<Link> {
        let mut links = Vec::with_capacity(1 + self.extras.len());
        if is_resolved(signature) {
            links.extend(self.explorer.fill(signature, mint));
        }
        links.extend(
            self.extras
                .iter()
                .filter_map(|template| template.fill(signature, mint)),
        );
        links
    }
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::new("https://solscan.io/tx/{signature}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SENTINEL;

    fn labels(links: &[Link]) -> Vec<&str> {
        links.iter().map(|link| link.label.as_str()).collect()
    }

    #[test]
    fn substitutes_signature_into_template() {
        let template = LinkTemplate::new("Dash", "https://example/{signature}/x");
        let link = template.fill("abc", SENTINEL).expect("link");
        assert_eq!(link.url, "https://example/abc/x");
    }

    #[test]
    fn replaces_every_placeholder_occurrence() {
        let template = LinkTemplate::new("Both", "https://x/{mint}?a={mint}&tx={signature}");
        let link = template.fill("sig", "Mint1").expect("link");
        assert_eq!(link.url, "https://x/Mint1?a=Mint1&tx=sig");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let template = LinkTemplate::new("Both", "https://x/{signature}/{mint}");
        let link = template.fill("{mint}", "Mint1").expect("link");
        assert_eq!(link.url, "https://x/%7Bmint%7D/Mint1");
    }

    #[test]
    fn substituted_values_are_percent_encoded() {
        let template = LinkTemplate::new("Tx", "https://x/tx/{signature}?m={mint}");
        let link = template.fill("a b?c#d", "M/1&x").expect("link");
        assert_eq!(link.url, "https://x/tx/a%20b%3Fc%23d?m=M%2F1%26x");
    }

    #[test]
    fn unknown_braces_are_kept() {
        let template = LinkTemplate::new("Raw", "https://x/{other}/{signature}");
        let link = template.fill("sig", SENTINEL).expect("link");
        assert_eq!(link.url, "https://x/{other}/sig");
    }

    #[test]
    fn empty_template_yields_no_link() {
        assert_eq!(LinkTemplate::new("Empty", "").fill("abc", "Mint1"), None);

        let builder = LinkBuilder::default()
            .with_template("Swap", Some(""))
            .with_template("Chart", None);
        assert_eq!(labels(&builder.build("abc", "Mint1")), vec!["Tx"]);
    }

    #[test]
    fn mint_links_require_a_resolved_mint() {
        let builder = LinkBuilder::default()
            .with_template("Swap", Some("https://jup.ag/swap/SOL-{mint}"))
            .with_template("Chart", Some("https://stats.example/tx/{signature}"))
            .with_template("Trade", Some("https://trade.example/{mint}"));

        let with_mint = builder.build("sig", "Mint1");
        assert_eq!(labels(&with_mint), vec!["Tx", "Swap", "Chart", "Trade"]);
        assert_eq!(with_mint[0].url, "https://solscan.io/tx/sig");
        assert_eq!(with_mint[1].url, "https://jup.ag/swap/SOL-Mint1");

        let without_mint = builder.build("sig", SENTINEL);
        assert_eq!(labels(&without_mint), vec!["Tx", "Chart"]);
    }

    #[test]
    fn unresolved_signature_drops_signature_links() {
        let builder = LinkBuilder::default()
            .with_template("Trade", Some("https://trade.example/{mint}"));

        let links = builder.build(SENTINEL, "Mint1");
        assert_eq!(labels(&links), vec!["Trade"]);
        assert!(builder.build(SENTINEL, SENTINEL).is_empty());
    }

    #[test]
    fn static_templates_are_emitted_verbatim() {
        let builder = LinkBuilder::default().with_template("Docs", Some("https://docs.example"));
        let links = builder.build(SENTINEL, SENTINEL);
        assert_eq!(links, vec![Link::new("Docs", "https://docs.example")]);
    }
}

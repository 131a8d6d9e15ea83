use crate::color::normalize::CssColorNormalizer;
use crate::config::ColorizeConfig;
use crate::error::ColorizeError;
use crate::parser::html;
use crate::recolor::{engine::OverrideEngine, reactor::Reactor};
use std::time::Instant;

pub mod colorize {
    use super::*;

    /// Re-skin a static HTML page: parse it, add `extra_css` after the page's
    /// own stylesheets, run the load-time sweep and serialize the result.
    pub fn generate(
        html_content: &str,
        extra_css: &[String],
        config: &ColorizeConfig,
    ) -> Result<String, ColorizeError> {
        let document = html::create_dom_tree(html_content);
        for css in extra_css {
            document.add_stylesheet(css)?;
        }

        let palette = config.build_palette(&CssColorNormalizer)?;
        let engine = OverrideEngine::new(palette, CssColorNormalizer);
        let mut reactor = Reactor::new(engine, config.strategy());
        reactor.start_reacting(&document, Instant::now());
        // A static page has nothing left to react to.
        reactor.stop(&document);

        Ok(html::serialize_document(&document))
    }
}

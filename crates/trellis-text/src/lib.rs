//! # Text evaluation
//!
//! Turns a model `ParameterizedText` into the plain string a text view shows.
//!
//! - `%s` placeholders are replaced, in order, by the text's params.
//!   Timestamps become host relative-time strings ("5m"); literals are
//!   inserted as-is. Surplus placeholders are left untouched.
//! - HTML text is flattened after substitution (see [`html`]).
//!
//! ```rust
//! use trellis_core::model::ParameterizedText;
//! use trellis_core::HostProviders;
//! use trellis_text::TemplatedStringEvaluator;
//!
//! let eval = TemplatedStringEvaluator::new(&HostProviders::default());
//! assert_eq!(eval.evaluate(&ParameterizedText::html("<h1>HEADING!</h1>")), "HEADING!\n\n");
//! ```

pub mod html;

use std::sync::Arc;
use trellis_core::model::{Param, ParameterizedText};
use trellis_core::{AssetProvider, Clock, HostProviders};

pub use html::html_to_text;

const PLACEHOLDER: &str = "%s";

#[derive(Clone)]
pub struct TemplatedStringEvaluator {
    assets: Arc<dyn AssetProvider>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TemplatedStringEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TemplatedStringEvaluator")
    }
}

impl TemplatedStringEvaluator {
    pub fn new(host: &HostProviders) -> Self {
        TemplatedStringEvaluator {
            assets: host.assets.clone(),
            clock: host.clock.clone(),
        }
    }

    pub fn evaluate(&self, text: &ParameterizedText) -> String {
        let substituted = if text.params.is_empty() {
            text.text.clone()
        } else {
            self.substitute(&text.text, &text.params)
        };
        if text.is_html {
            html_to_text(&substituted)
        } else {
            substituted
        }
    }

    fn substitute(&self, template: &str, params: &[Param]) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        let mut params = params.iter();
        while let Some(at) = rest.find(PLACEHOLDER) {
            out.push_str(&rest[..at]);
            match params.next() {
                Some(param) => out.push_str(&self.param_value(param)),
                None => out.push_str(PLACEHOLDER),
            }
            rest = &rest[at + PLACEHOLDER.len()..];
        }
        out.push_str(rest);
        if params.next().is_some() {
            log::debug!("more params than placeholders in {template:?}");
        }
        out
    }

    fn param_value(&self, param: &Param) -> String {
        match param {
            Param::Literal(s) => s.clone(),
            Param::Timestamp { seconds } => {
                let now_ms = self.clock.current_time_ms();
                let elapsed = now_ms.saturating_sub(seconds.saturating_mul(1000));
                self.assets.relative_time_string(elapsed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::model::Image;
    use trellis_core::{ImageConsumer, TypefaceConsumer};

    struct FixedClock(u64);
    impl Clock for FixedClock {
        fn current_time_ms(&self) -> u64 {
            self.0
        }
    }

    struct MinutesAgo;
    impl AssetProvider for MinutesAgo {
        fn get_image(&self, _: &Image, _: Option<i32>, _: Option<i32>, c: ImageConsumer) {
            c(None)
        }
        fn get_typeface(&self, _: &str, _: bool, c: TypefaceConsumer) {
            c(None)
        }
        fn relative_time_string(&self, elapsed_ms: u64) -> String {
            format!("{} minutes ago", elapsed_ms / 60_000)
        }
    }

    fn evaluator(now_ms: u64) -> TemplatedStringEvaluator {
        let host = HostProviders::default()
            .assets(Arc::new(MinutesAgo))
            .clock(Arc::new(FixedClock(now_ms)));
        TemplatedStringEvaluator::new(&host)
    }

    #[test]
    fn test_plain_text_passes_through() {
        let eval = evaluator(0);
        assert_eq!(eval.evaluate(&ParameterizedText::plain("Content")), "Content");
    }

    #[test]
    fn test_params_replace_placeholders_in_order() {
        let eval = evaluator(10 * 60_000);
        let text = ParameterizedText {
            text: "%s posted %s".into(),
            is_html: false,
            params: vec![Param::Literal("Ann".into()), Param::Timestamp { seconds: 0 }],
        };
        assert_eq!(eval.evaluate(&text), "Ann posted 10 minutes ago");
    }

    #[test]
    fn test_missing_params_leave_placeholder() {
        let eval = evaluator(0);
        let text = ParameterizedText {
            text: "%s and %s".into(),
            is_html: false,
            params: vec![Param::Literal("one".into())],
        };
        assert_eq!(eval.evaluate(&text), "one and %s");
    }

    #[test]
    fn test_future_timestamp_clamps_to_zero() {
        let eval = evaluator(1_000);
        let text = ParameterizedText {
            text: "%s".into(),
            is_html: false,
            params: vec![Param::Timestamp { seconds: 3_600 }],
        };
        assert_eq!(eval.evaluate(&text), "0 minutes ago");
    }

    #[test]
    fn test_html_heading() {
        let eval = evaluator(0);
        assert_eq!(
            eval.evaluate(&ParameterizedText::html("<h1>HEADING!</h1>")),
            "HEADING!\n\n"
        );
    }

    #[test]
    fn test_html_applies_after_substitution() {
        let eval = evaluator(0);
        let text = ParameterizedText {
            text: "<b>%s</b> &amp; co".into(),
            is_html: true,
            params: vec![Param::Literal("Ann".into())],
        };
        assert_eq!(eval.evaluate(&text), "Ann & co");
    }
}

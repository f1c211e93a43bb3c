use crate::mask::RoundedCornerMaskCache;
use crate::registry::AdapterFactories;
use crate::style::{StyleDescriptor, StylesheetCache};
use std::sync::Arc;
use trellis_core::{HostProviders, TrellisConfig};
use trellis_text::TemplatedStringEvaluator;

/// Host-scoped state shared by every frame a host binds: configuration,
/// providers, adapter pools and the caches behind them. Build one per host
/// and share it.
#[derive(Debug)]
pub struct AdapterParameters {
    pub config: TrellisConfig,
    pub host: HostProviders,
    pub factories: AdapterFactories,
    pub default_style: Arc<StyleDescriptor>,
    pub stylesheet_cache: Arc<StylesheetCache>,
    pub mask_cache: RoundedCornerMaskCache,
    pub text_evaluator: TemplatedStringEvaluator,
}

impl AdapterParameters {
    pub fn new(config: TrellisConfig, host: HostProviders) -> Arc<Self> {
        Arc::new(AdapterParameters {
            factories: AdapterFactories::new(&config),
            default_style: Arc::new(StyleDescriptor::default()),
            stylesheet_cache: Arc::new(StylesheetCache::new()),
            mask_cache: RoundedCornerMaskCache::new(),
            text_evaluator: TemplatedStringEvaluator::new(&host),
            config,
            host,
        })
    }

    /// Drops every pooled adapter and the secondary caches. Adapters that
    /// are currently bound are untouched.
    pub fn purge_recycler_pools(&self) {
        log::debug!("purging recycler pools");
        self.factories.purge_all();
        self.stylesheet_cache.purge();
        self.mask_cache.purge();
    }
}

#[cfg(test)]
mod tests {
    use crate::adapter::ElementAdapter;
    use crate::testing::*;
    use trellis_core::Corners;
    use trellis_core::model::Stylesheet;

    #[test]
    fn test_purge_cascades_to_caches() {
        let params = params();
        let ctx = frame_context(&params);

        let mut adapter = params.factories.text.get(&text("x"), &ctx, &params).unwrap();
        adapter.create_adapter(&text("x"), &ctx, &params).unwrap();
        params.factories.text.release(adapter, &params);
        params.mask_cache.mask(4, Corners::ALL);
        params.stylesheet_cache.index(&Stylesheet {
            stylesheet_id: "s".into(),
            ..Default::default()
        });

        params.purge_recycler_pools();
        assert_eq!(params.factories.text.pooled(), 0);
        assert!(params.mask_cache.is_empty());
        assert!(params.stylesheet_cache.is_empty());
    }
}

use crate::adapter::{AdapterBase, ElementAdapter};
use crate::context::FrameContext;
use crate::key::AdapterKind;
use crate::params::AdapterParameters;
use trellis_core::model::{CustomContent, CustomElement, CustomElementData, Element, ElementKind};
use trellis_core::{Result, TrellisError, ViewHandle, ViewKind};

/// Hosts a view produced by the host's `CustomElementProvider`. The provider
/// view lives inside a box owned by the adapter and is handed back on unbind.
pub struct CustomElementAdapter {
    base: AdapterBase,
    bound: Option<(ViewHandle, CustomElementData)>,
}

impl ElementAdapter for CustomElementAdapter {
    type Model = CustomElement;
    const KIND: AdapterKind = AdapterKind::Custom;

    fn new_adapter(params: &AdapterParameters) -> Self {
        CustomElementAdapter {
            base: AdapterBase::new(ViewHandle::new(ViewKind::Box), params.default_style.clone()),
            bound: None,
        }
    }

    fn base(&self) -> &AdapterBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AdapterBase {
        &mut self.base
    }

    fn model_from_element(element: &Element) -> Result<&CustomElement> {
        match &element.kind {
            Some(ElementKind::Custom(custom)) => Ok(custom),
            _ => Err(TrellisError::MissingContent {
                kind: "CustomElement",
            }),
        }
    }

    fn on_create(
        &mut self,
        _model: &CustomElement,
        _element: &Element,
        _ctx: &FrameContext,
        _params: &AdapterParameters,
    ) -> Result<()> {
        Ok(())
    }

    fn on_bind(
        &mut self,
        model: &CustomElement,
        _element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        let data = match &model.content {
            Some(CustomContent::Data(data)) => data.clone(),
            Some(CustomContent::Binding(binding)) => {
                let value = ctx.get_custom_element_binding_value(binding)?;
                match value.custom_element_data() {
                    Some(data) => data.clone(),
                    None => return self.base.hide_for_absent_binding(binding, "Custom"),
                }
            }
            None => return Err(TrellisError::UnhandledContent("not set".into())),
        };
        let view = params.host.custom_elements.create_custom_element(&data);
        self.base.base_view().attach_child(&view);
        self.bound = Some((view, data));
        Ok(())
    }

    fn on_unbind(&mut self, params: &AdapterParameters) {
        if let Some((view, data)) = self.bound.take() {
            self.base.base_view().detach_child(&view);
            params.host.custom_elements.release_custom_view(&view, &data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use std::sync::Arc;
    use trellis_core::HostProviders;
    use trellis_core::model::{BindingRef, BindingValue, BoundValue};

    fn custom(content: CustomContent) -> Element {
        Element::new(ElementKind::Custom(CustomElement {
            content: Some(content),
        }))
    }

    #[test]
    fn test_custom_view_is_created_and_released() {
        let provider = Arc::new(CountingCustomElements::default());
        let params = params_with(
            Default::default(),
            HostProviders::new().custom_elements(provider.clone()),
        );
        let ctx = frame_context(&params);
        let element = custom(CustomContent::Data(CustomElementData {
            payload: "chart".into(),
        }));
        let mut adapter = CustomElementAdapter::new_adapter(&params);

        adapter.bind_model(&element, &ctx, &params).unwrap();
        assert_eq!(adapter.view().child_count(), 1);
        assert_eq!(provider.created(), vec!["chart"]);

        adapter.unbind_model(&params);
        assert_eq!(adapter.view().child_count(), 0);
        assert_eq!(provider.released(), vec!["chart"]);
    }

    #[test]
    fn test_bound_custom_data() {
        let params = params();
        let ctx = template_context(
            &params,
            vec![BindingValue::new(
                "c",
                BoundValue::CustomElementData(CustomElementData {
                    payload: "bound".into(),
                }),
            )],
        );
        let mut adapter = CustomElementAdapter::new_adapter(&params);
        adapter
            .bind_model(&custom(CustomContent::Binding(BindingRef::new("c"))), &ctx, &params)
            .unwrap();
        let child = adapter.view().child_at(0).unwrap();
        assert!(child.with(|n| matches!(
            &n.kind,
            ViewKind::Custom { payload: Some(p) } if p == "bound"
        )));
    }

    #[test]
    fn test_custom_without_content_is_fatal() {
        let params = params();
        let ctx = frame_context(&params);
        let mut adapter = CustomElementAdapter::new_adapter(&params);
        let element = Element::new(ElementKind::Custom(CustomElement::default()));
        let err = adapter.bind_model(&element, &ctx, &params).unwrap_err();
        assert_eq!(err.to_string(), "Unhandled Content type: not set");
    }
}

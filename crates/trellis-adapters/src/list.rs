use crate::adapter::{AdapterBase, ElementAdapter};
use crate::container::{ContainerChildren, child_layout};
use crate::context::FrameContext;
use crate::key::AdapterKind;
use crate::params::AdapterParameters;
use trellis_core::model::{Content, Element, ElementKind, ElementList, ElementStack};
use trellis_core::{Dimension, Result, TrellisError, ViewHandle, ViewKind};

fn content_refs(contents: &[Content]) -> Vec<&Content> {
    contents.iter().collect()
}

/// Vertical list. Children default to full width and wrapped height.
pub struct ElementListAdapter {
    base: AdapterBase,
    children: ContainerChildren,
}

impl ElementListAdapter {
    pub fn children(&self) -> &ContainerChildren {
        &self.children
    }
}

impl ElementAdapter for ElementListAdapter {
    type Model = ElementList;
    const KIND: AdapterKind = AdapterKind::List;

    fn new_adapter(params: &AdapterParameters) -> Self {
        ElementListAdapter {
            base: AdapterBase::new(ViewHandle::column(), params.default_style.clone()),
            children: ContainerChildren::default(),
        }
    }

    fn base(&self) -> &AdapterBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AdapterBase {
        &mut self.base
    }

    fn model_from_element(element: &Element) -> Result<&ElementList> {
        match &element.kind {
            Some(ElementKind::List(list)) => Ok(list),
            _ => Err(TrellisError::MissingContent {
                kind: "ElementList",
            }),
        }
    }

    fn on_create(
        &mut self,
        model: &ElementList,
        _element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        let parent = self.base.base_view().clone();
        self.children
            .create_inline(&content_refs(&model.contents), &parent, ctx, params)
    }

    fn on_bind(
        &mut self,
        model: &ElementList,
        _element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        let parent = self.base.base_view().clone();
        self.children.bind(
            &content_refs(&model.contents),
            &parent,
            ctx,
            params,
            |_, child| child_layout(child, Dimension::MatchParent, Dimension::WrapContent),
        )
    }

    fn on_unbind(&mut self, params: &AdapterParameters) {
        self.children.release_all(self.base.base_view(), params);
    }

    fn on_release(&mut self, params: &AdapterParameters) {
        self.children.release_all(self.base.base_view(), params);
    }
}

/// Children drawn on top of each other in content order.
pub struct ElementStackAdapter {
    base: AdapterBase,
    children: ContainerChildren,
}

impl ElementStackAdapter {
    pub fn children(&self) -> &ContainerChildren {
        &self.children
    }
}

impl ElementAdapter for ElementStackAdapter {
    type Model = ElementStack;
    const KIND: AdapterKind = AdapterKind::Stack;

    fn new_adapter(params: &AdapterParameters) -> Self {
        ElementStackAdapter {
            base: AdapterBase::new(ViewHandle::new(ViewKind::Stack), params.default_style.clone()),
            children: ContainerChildren::default(),
        }
    }

    fn base(&self) -> &AdapterBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AdapterBase {
        &mut self.base
    }

    fn model_from_element(element: &Element) -> Result<&ElementStack> {
        match &element.kind {
            Some(ElementKind::Stack(stack)) => Ok(stack),
            _ => Err(TrellisError::MissingContent {
                kind: "ElementStack",
            }),
        }
    }

    fn on_create(
        &mut self,
        model: &ElementStack,
        _element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        let parent = self.base.base_view().clone();
        self.children
            .create_inline(&content_refs(&model.contents), &parent, ctx, params)
    }

    fn on_bind(
        &mut self,
        model: &ElementStack,
        _element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        let parent = self.base.base_view().clone();
        self.children.bind(
            &content_refs(&model.contents),
            &parent,
            ctx,
            params,
            |_, child| child_layout(child, Dimension::WrapContent, Dimension::WrapContent),
        )
    }

    fn on_unbind(&mut self, params: &AdapterParameters) {
        self.children.release_all(self.base.base_view(), params);
    }

    fn on_release(&mut self, params: &AdapterParameters) {
        self.children.release_all(self.base.base_view(), params);
    }
}

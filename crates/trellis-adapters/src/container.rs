//! Child bookkeeping shared by lists, stacks and grid rows.
//!
//! Inline content (elements and template invocations) is adapted when the
//! container is created. Bound content can only be resolved once a binding
//! table is available, so it is adapted on bind and spliced in at the
//! position of its content entry. Unbinding hands every child back to its
//! factory; the next bind re-materializes the inline ones.

use crate::context::FrameContext;
use crate::params::AdapterParameters;
use crate::registry::AnyAdapter;
use trellis_core::model::Content;
use trellis_core::{Dimension, LayoutParams, Result, TrellisError, ViewHandle};

#[derive(Debug)]
pub struct ChildAdapter {
    /// Index of the content entry this child came from.
    pub content_index: usize,
    /// Position among the adapters of that entry; a template invocation
    /// yields one per binding context.
    pub slot: usize,
    pub adapter: AnyAdapter,
}

#[derive(Debug, Default)]
pub struct ContainerChildren {
    children: Vec<ChildAdapter>,
    inline_indices: Vec<usize>,
    materialized: bool,
}

impl ContainerChildren {
    pub fn children(&self) -> &[ChildAdapter] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn create_inline(
        &mut self,
        contents: &[&Content],
        parent: &ViewHandle,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        self.materialized = true;
        self.inline_indices.clear();
        for (index, content) in contents.iter().enumerate() {
            if content.is_bound() {
                continue;
            }
            self.inline_indices.push(index);
            let adapters = params.factories.create_adapters_for_content(content, ctx, params)?;
            for (slot, adapter) in adapters.into_iter().enumerate() {
                parent.attach_child(adapter.view());
                self.children.push(ChildAdapter {
                    content_index: index,
                    slot,
                    adapter,
                });
            }
        }
        Ok(())
    }

    pub fn bind(
        &mut self,
        contents: &[&Content],
        parent: &ViewHandle,
        ctx: &FrameContext,
        params: &AdapterParameters,
        layout: impl Fn(usize, &AnyAdapter) -> LayoutParams,
    ) -> Result<()> {
        if !self.materialized {
            self.create_inline(contents, parent, ctx, params)?;
        }
        let inline = contents
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_bound())
            .map(|(i, _)| i);
        if !inline.eq(self.inline_indices.iter().copied()) {
            return Err(TrellisError::AdapterCountMismatch);
        }

        for child in &mut self.children {
            let content = contents
                .get(child.content_index)
                .ok_or(TrellisError::AdapterCountMismatch)?;
            bind_inline(child, content, ctx, params)?;
        }

        for (index, content) in contents.iter().enumerate() {
            if !content.is_bound() {
                continue;
            }
            let adapters = params.factories.adapt_bound_content(content, ctx, params)?;
            let mut at = self.children.partition_point(|c| c.content_index < index);
            for (slot, adapter) in adapters.into_iter().enumerate() {
                parent.insert_child(at, adapter.view());
                self.children.insert(
                    at,
                    ChildAdapter {
                        content_index: index,
                        slot,
                        adapter,
                    },
                );
                at += 1;
            }
        }

        for child in &self.children {
            child
                .adapter
                .view()
                .set_layout_params(layout(child.content_index, &child.adapter));
        }
        Ok(())
    }

    /// Returns every child to its factory and detaches its view.
    pub fn release_all(&mut self, parent: &ViewHandle, params: &AdapterParameters) {
        for child in self.children.drain(..) {
            parent.detach_child(child.adapter.view());
            params.factories.release_and_recycle(child.adapter, params);
        }
        self.inline_indices.clear();
        self.materialized = false;
    }
}

fn bind_inline(
    child: &mut ChildAdapter,
    content: &Content,
    ctx: &FrameContext,
    params: &AdapterParameters,
) -> Result<()> {
    match content {
        Content::Element(element) => child.adapter.bind_element(element, ctx, params),
        Content::TemplateInvocation(invocation) => {
            let binding_context = invocation
                .binding_contexts
                .get(child.slot)
                .ok_or(TrellisError::AdapterCountMismatch)?;
            child
                .adapter
                .bind_template(&invocation.template_id, binding_context, ctx, params)
        }
        Content::BoundElement(_) | Content::BoundTemplate(_) => {
            Err(TrellisError::AdapterCountMismatch)
        }
    }
}

/// Layout for a child from its own style: explicit sizes win over the
/// container defaults, margins and gravity always come from the child.
pub fn child_layout(
    child: &AnyAdapter,
    default_width: Dimension,
    default_height: Dimension,
) -> LayoutParams {
    let style = child.element_style();
    let mut params = LayoutParams {
        width: Dimension::from_px(child.computed_width_px(), default_width),
        height: Dimension::from_px(child.computed_height_px(), default_height),
        gravity: style.gravity,
        ..LayoutParams::default()
    };
    style.apply_margins(&mut params);
    params
}

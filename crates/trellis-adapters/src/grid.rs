use crate::adapter::{AdapterBase, ElementAdapter};
use crate::container::ContainerChildren;
use crate::context::FrameContext;
use crate::key::AdapterKind;
use crate::params::AdapterParameters;
use crate::registry::AnyAdapter;
use trellis_core::model::{
    CellWidth, Content, ContentWidth, Element, ElementKind, GridCell, GridRow,
};
use trellis_core::{
    Dimension, ErrorCode, Gravity, LayoutParams, MessageType, Result, TrellisError, ViewHandle,
    ViewKind, dp_to_px,
};

/// A horizontal row of cells. Cells may draw outside the row, so the row
/// does not clip.
pub struct GridRowAdapter {
    base: AdapterBase,
    children: ContainerChildren,
}

impl GridRowAdapter {
    pub fn children(&self) -> &ContainerChildren {
        &self.children
    }
}

fn cell_contents(row: &GridRow) -> Result<Vec<&Content>> {
    row.cells
        .iter()
        .map(|cell| {
            cell.content
                .as_ref()
                .ok_or_else(|| TrellisError::UnhandledContent("not set".into()))
        })
        .collect()
}

fn cell_layout(
    cell: Option<&GridCell>,
    child: &AnyAdapter,
    ctx: &FrameContext,
) -> LayoutParams {
    let style = child.element_style();
    let mut params = LayoutParams {
        width: Dimension::Px(0),
        height: Dimension::from_px(child.computed_height_px(), Dimension::WrapContent),
        weight: 1.0,
        gravity: Gravity {
            vertical: style.gravity.vertical,
            ..Gravity::default()
        },
        ..LayoutParams::default()
    };
    style.apply_margins(&mut params);

    let width = cell.and_then(|cell| {
        cell.width.clone().or_else(|| {
            cell.width_binding
                .as_ref()
                .and_then(|binding| ctx.grid_cell_width_from_binding(binding))
        })
    });
    let Some(width) = width else {
        return params;
    };
    params.collapsible = width.is_collapsible;
    match width.width {
        CellWidth::Dp(dp) => {
            params.width = Dimension::Px(dp_to_px(dp as f32, ctx.density()));
            params.weight = 0.0;
        }
        CellWidth::Weight(weight) => {
            params.weight = weight as f32;
        }
        CellWidth::ContentWidth(ContentWidth::ContentWidth) => {
            params.width = Dimension::from_px(child.computed_width_px(), Dimension::WrapContent);
            params.weight = 0.0;
        }
        CellWidth::ContentWidth(ContentWidth::InvalidContentWidth) => {
            ctx.report_message(
                MessageType::Warning,
                ErrorCode::GridCellWidthWithoutContents,
                "Invalid content width: INVALID_CONTENT_WIDTH",
            );
            params.width = Dimension::WrapContent;
            params.weight = 0.0;
        }
    }
    params
}

impl ElementAdapter for GridRowAdapter {
    type Model = GridRow;
    const KIND: AdapterKind = AdapterKind::GridRow;

    fn new_adapter(params: &AdapterParameters) -> Self {
        let view = ViewHandle::new(ViewKind::GridRow);
        view.set_clip_children(false);
        GridRowAdapter {
            base: AdapterBase::new(view, params.default_style.clone()),
            children: ContainerChildren::default(),
        }
    }

    fn base(&self) -> &AdapterBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AdapterBase {
        &mut self.base
    }

    fn model_from_element(element: &Element) -> Result<&GridRow> {
        match &element.kind {
            Some(ElementKind::GridRow(row)) => Ok(row),
            _ => Err(TrellisError::MissingContent { kind: "GridRow" }),
        }
    }

    fn on_create(
        &mut self,
        model: &GridRow,
        _element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        let parent = self.base.base_view().clone();
        self.children
            .create_inline(&cell_contents(model)?, &parent, ctx, params)
    }

    fn on_bind(
        &mut self,
        model: &GridRow,
        _element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<()> {
        let parent = self.base.base_view().clone();
        self.children.bind(
            &cell_contents(model)?,
            &parent,
            ctx,
            params,
            |index, child| cell_layout(model.cells.get(index), child, ctx),
        )
    }

    fn on_unbind(&mut self, params: &AdapterParameters) {
        self.children.release_all(self.base.base_view(), params);
    }

    fn on_release(&mut self, params: &AdapterParameters) {
        self.children.release_all(self.base.base_view(), params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use trellis_core::model::{
        BindingRef, BindingValue, BoundValue, GridCellWidth, Style, VerticalAlignment,
    };
    use trellis_core::VerticalGravity;

    fn cell(content: Element, width: Option<CellWidth>) -> GridCell {
        GridCell {
            content: Some(Content::Element(content)),
            width: width.map(|width| GridCellWidth {
                width,
                is_collapsible: false,
            }),
            width_binding: None,
        }
    }

    fn row(cells: Vec<GridCell>) -> Element {
        Element::new(ElementKind::GridRow(GridRow { cells }))
    }

    fn layouts(adapter: &GridRowAdapter) -> Vec<LayoutParams> {
        adapter
            .view()
            .children()
            .iter()
            .map(|v| v.layout_params())
            .collect()
    }

    #[test]
    fn test_cell_widths() {
        let params = params_with(
            trellis_core::TrellisConfig {
                density: 2.0,
                ..Default::default()
            },
            Default::default(),
        );
        let ctx = frame_context_with_styles(
            &params,
            vec![Style {
                width: Some(40),
                gravity_vertical: Some(VerticalAlignment::Middle),
                ..Style::new("fixed")
            }],
        );
        let element = row(vec![
            cell(text("default"), None),
            cell(text("dp"), Some(CellWidth::Dp(10))),
            cell(text("weight"), Some(CellWidth::Weight(3))),
            cell(
                text("content").styles(&["fixed"]),
                Some(CellWidth::ContentWidth(ContentWidth::ContentWidth)),
            ),
            cell(text("wrap"), Some(CellWidth::ContentWidth(ContentWidth::ContentWidth))),
        ]);
        let mut adapter = GridRowAdapter::new_adapter(&params);
        adapter.bind_model(&element, &ctx, &params).unwrap();

        let l = layouts(&adapter);
        assert_eq!((l[0].width, l[0].weight), (Dimension::Px(0), 1.0));
        assert_eq!((l[1].width, l[1].weight), (Dimension::Px(20), 0.0));
        assert_eq!((l[2].width, l[2].weight), (Dimension::Px(0), 3.0));
        assert_eq!((l[3].width, l[3].weight), (Dimension::Px(80), 0.0));
        assert_eq!(l[3].gravity.vertical, VerticalGravity::Middle);
        assert_eq!(l[4].width, Dimension::WrapContent);
        assert!(!adapter.view().clips_children());
    }

    #[test]
    fn test_invalid_content_width_warns() {
        let params = params();
        let ctx = frame_context(&params);
        let element = row(vec![cell(
            text("x"),
            Some(CellWidth::ContentWidth(ContentWidth::InvalidContentWidth)),
        )]);
        let mut adapter = GridRowAdapter::new_adapter(&params);
        adapter.bind_model(&element, &ctx, &params).unwrap();

        assert_eq!(layouts(&adapter)[0].width, Dimension::WrapContent);
        assert_eq!(
            ctx.debug_logger().messages(MessageType::Warning),
            vec!["Invalid content width: INVALID_CONTENT_WIDTH"]
        );
    }

    #[test]
    fn test_bound_cell_width_and_collapsible() {
        let params = params();
        let ctx = template_context(
            &params,
            vec![BindingValue::new(
                "w",
                BoundValue::CellWidth(GridCellWidth {
                    width: CellWidth::Weight(2),
                    is_collapsible: true,
                }),
            )],
        );
        let element = row(vec![GridCell {
            content: Some(Content::Element(text("x"))),
            width: None,
            width_binding: Some(BindingRef::new("w")),
        }]);
        let mut adapter = GridRowAdapter::new_adapter(&params);
        adapter.bind_model(&element, &ctx, &params).unwrap();

        let l = layouts(&adapter);
        assert_eq!(l[0].weight, 2.0);
        assert!(l[0].collapsible);
    }

    #[test]
    fn test_cell_without_content_is_fatal() {
        let params = params();
        let ctx = frame_context(&params);
        let element = row(vec![GridCell::default()]);
        let mut adapter = GridRowAdapter::new_adapter(&params);
        let err = adapter.create_adapter(&element, &ctx, &params).unwrap_err();
        assert_eq!(err.to_string(), "Unhandled Content type: not set");

        let mut fresh = GridRowAdapter::new_adapter(&params);
        let err = fresh
            .create_adapter(&text("not a row"), &ctx, &params)
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing GridRow");
    }
}

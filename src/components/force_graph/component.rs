use std::cell::RefCell;
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::{CLICK_SLOP, ForceGraphState, ZOOM_STEP};
use super::types::GraphData;
use crate::session::{ClickTarget, FrameSource, VisualEdgeAttributes};

type SharedState = Rc<RefCell<Option<ForceGraphState>>>;

/// Pointer position relative to the canvas.
fn local_position(canvas_ref: NodeRef<Canvas>, client_x: i32, client_y: i32) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((client_x as f64 - rect.left(), client_y as f64 - rect.top()))
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Renders the session graph on a canvas with force-directed layout.
///
/// `data` rebuilds the layout; `visuals` only restyles edges, so result changes keep
/// node positions. Clicks on nodes and edges are reported through `on_select`.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] visuals: Signal<Vec<VisualEdgeAttributes>>,
	#[prop(optional)] on_select: Option<Callback<ClickTarget>>,
	#[prop(optional)] node_ref: Option<NodeRef<Canvas>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = node_ref.unwrap_or_else(NodeRef::new);
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if animate_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => return,
			},
			_ => {
				log::error!("canvas has no 2d context");
				return;
			}
		};
		let mut initial = ForceGraphState::new(&data.get_untracked(), w, h);
		initial.apply_visuals(&visuals.get_untracked());
		*state_init.borrow_mut() = Some(initial);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.animation_running {
					s.tick(0.016);
				}
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// A new graph means a new layout.
	let state_data = state.clone();
	Effect::new(move |_| {
		let graph = data.get();
		if let Some(ref mut s) = *state_data.borrow_mut() {
			let mut fresh = ForceGraphState::new(&graph, s.width, s.height);
			fresh.apply_visuals(&visuals.get_untracked());
			*s = fresh;
		}
	});

	let state_visuals = state.clone();
	Effect::new(move |_| {
		let attrs = visuals.get();
		if let Some(ref mut s) = *state_visuals.borrow_mut() {
			s.apply_visuals(&attrs);
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};

		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.press = Some((x, y));
			if let Some(idx) = s.node_at_position(x, y) {
				s.drag.active = true;
				s.drag.node_idx = Some(idx);
				s.drag.start_x = x;
				s.drag.start_y = y;
				s.graph.visit_nodes(|node| {
					if node.index() == idx {
						s.drag.node_start_x = node.x();
						s.drag.node_start_y = node.y();
					}
				});
			} else {
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};

		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.hover.pointer = (x, y);
			// Update hover state when not dragging
			if !s.drag.active {
				let hovered = s.node_at_position(x, y);
				s.set_hover(hovered);
				s.hover.edge = match hovered {
					Some(_) => None,
					None => s.edge_at_position(x, y),
				};
			}

			if s.drag.active {
				if let Some(idx) = s.drag.node_idx {
					let (dx, dy) = (
						(x - s.drag.start_x) / s.transform.k,
						(y - s.drag.start_y) / s.transform.k,
					);
					let (nx, ny) = (
						s.drag.node_start_x + dx as f32,
						s.drag.node_start_y + dy as f32,
					);
					s.graph.visit_nodes_mut(|node| {
						if node.index() == idx {
							node.data.x = nx;
							node.data.y = ny;
							node.data.is_anchor = true;
						}
					});
				}
			} else if s.pan.active {
				s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
				s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let position = local_position(canvas_ref, ev.client_x(), ev.client_y());
		let mut clicked = None;
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			if let (Some((px, py)), Some((x, y))) = (s.press.take(), position) {
				if (x - px).hypot(y - py) < CLICK_SLOP {
					clicked = s.hit_test(x, y);
				}
			}
			if s.drag.active {
				if let Some(idx) = s.drag.node_idx {
					s.graph.visit_nodes_mut(|node| {
						if node.index() == idx {
							node.data.is_anchor = true;
						}
					});
				}
			}
			s.drag.active = false;
			s.drag.node_idx = None;
			s.pan.active = false;
		}
		// Run outside the borrow: the callback may push new visuals synchronously.
		if let (Some(target), Some(cb)) = (clicked, on_select) {
			cb.run(target);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.drag.active = false;
			s.drag.node_idx = None;
			s.pan.active = false;
			s.press = None;
			s.hover.edge = None;
			s.set_hover(None);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_position(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};

		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.zoom_about(factor, x, y);
		}
	};

	// Buttons zoom about the canvas centre.
	let zoom_by = move |state: &SharedState, factor: f64| {
		if let Some(ref mut s) = *state.borrow_mut() {
			let (cx, cy) = (s.width / 2.0, s.height / 2.0);
			s.zoom_about(factor, cx, cy);
		}
	};
	let (state_zi, state_zo) = (state.clone(), state.clone());
	let on_zoom_in = move |_: MouseEvent| zoom_by(&state_zi, ZOOM_STEP);
	let on_zoom_out = move |_: MouseEvent| zoom_by(&state_zo, 1.0 / ZOOM_STEP);

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
		<div class="zoom-controls">
			<button class="zoom-in" title="Zoom in" on:click=on_zoom_in>
				"+"
			</button>
			<button class="zoom-out" title="Zoom out" on:click=on_zoom_out>
				"-"
			</button>
		</div>
	}
}

/// The canvas' current frame as a PNG data URL.
pub struct CanvasFrame(pub HtmlCanvasElement);

impl FrameSource for CanvasFrame {
	type Error = JsValue;

	fn current_frame(&self) -> Result<String, JsValue> {
		self.0.to_data_url_with_type("image/png")
	}
}

//! UI components. Every state change goes through [`send`].

pub mod export;
pub mod force_graph;
pub mod help;
pub mod results_table;
pub mod selection;
pub mod upload;

use leptos::prelude::*;
use log::warn;

use crate::session::{Session, SessionEffect, SessionEvent};

/// User-facing message line shared by the panels.
#[derive(Clone, Copy)]
pub struct Notice(pub RwSignal<Option<String>>);

impl Notice {
	/// Replaces the current message.
	pub fn show(&self, msg: impl Into<String>) {
		self.0.set(Some(msg.into()));
	}

	/// Hides the banner.
	pub fn clear(&self) {
		self.0.set(None);
	}
}

/// Feeds `event` to the session, surfacing any error as a notice.
pub fn send(session: RwSignal<Session>, notice: Notice, event: SessionEvent) -> Option<SessionEffect> {
	match session.try_update(|s| s.handle(event))? {
		Ok(effect) => Some(effect),
		Err(err) => {
			warn!("{err}");
			notice.show(err.to_string());
			None
		}
	}
}

/// Notice banner; click to dismiss.
#[component]
pub fn NoticeBanner(notice: Notice) -> impl IntoView {
	view! {
		<Show when=move || notice.0.with(Option::is_some)>
			<pre class="notice" on:click=move |_| notice.clear()>
				{move || notice.0.get().unwrap_or_default()}
			</pre>
		</Show>
	}
}

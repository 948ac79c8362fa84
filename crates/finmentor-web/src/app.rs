//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::pages::{ChatPage, PortfolioPage};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    view! {
        <Router>
            <nav class="sidebar">
                <span class="brand">"FinMentor AI"</span>
                <A href="/">"AI Chat"</A>
                <A href="/portfolio">"Portfolio Generator"</A>
            </nav>
            <main class="app">
                <Routes fallback=|| view! { <p>"Page not found"</p> }>
                    <Route path=path!("/") view=ChatPage />
                    <Route path=path!("/portfolio") view=PortfolioPage />
                </Routes>
            </main>
        </Router>
    }
}

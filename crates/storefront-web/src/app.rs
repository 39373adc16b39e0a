//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::components::NavBar;
use crate::pages::{CheckoutPage, HomePage, SuccessPage};
use crate::state::CartContext;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_context(CartContext::load());

    view! {
        <Router>
            <NavBar />
            <main class="app">
                <Routes fallback=|| view! { <p>"Página no encontrada"</p> }>
                    <Route path=path!("/") view=HomePage />
                    <Route path=path!("/checkout") view=CheckoutPage />
                    <Route path=path!("/success") view=SuccessPage />
                </Routes>
            </main>
        </Router>
    }
}

//! Success Page

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::state::use_cart;

#[component]
pub fn SuccessPage() -> impl IntoView {
    let cart = use_cart();
    let query = use_query_map();
    let session_id = move || query.read().get("session_id").unwrap_or_default();

    // Payment went through; the cart has been ordered
    cart.clear();

    view! {
        <div class="success">
            <h1>"¡Gracias por tu compra!"</h1>
            <p>"Recibirás un correo con la confirmación de tu pedido."</p>
            <Show when=move || !session_id().is_empty()>
                <p class="reference">"Referencia: " {session_id}</p>
            </Show>
            <a href="/" class="btn">"Seguir comprando"</a>
        </div>
    }
}

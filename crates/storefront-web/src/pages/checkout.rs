//! Checkout Page

use leptos::prelude::*;

use crate::api::{self, CustomerForm};
use crate::components::CartRow;
use crate::state::{format_price, use_cart};

/// Progress of the hand-off to hosted checkout
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutStatus {
    Idle,
    Submitting,
    Redirecting,
    Failed(String),
}

impl CheckoutStatus {
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Submitting | Self::Redirecting)
    }
}

#[component]
pub fn CheckoutPage() -> impl IntoView {
    let cart = use_cart();
    let (status, set_status) = signal(CheckoutStatus::Idle);
    let (email, set_email) = signal(String::new());
    let (name, set_name) = signal(String::new());
    let (phone, set_phone) = signal(String::new());
    let (address, set_address) = signal(String::new());

    let pay = move |_| {
        let items = cart.items.get_untracked();
        if items.is_empty() || status.with_untracked(CheckoutStatus::is_busy) {
            return;
        }

        let customer = CustomerForm::from_fields(
            &email.get_untracked(),
            &name.get_untracked(),
            &phone.get_untracked(),
            &address.get_untracked(),
        );
        set_status.set(CheckoutStatus::Submitting);

        leptos::task::spawn_local(async move {
            match api::create_checkout_session(&items, &customer).await {
                Ok(redirect) => {
                    set_status.set(CheckoutStatus::Redirecting);
                    let navigated = web_sys::window()
                        .is_some_and(|w| w.location().set_href(&redirect.url).is_ok());
                    if !navigated {
                        set_status.set(CheckoutStatus::Failed(
                            "No se pudo abrir la página de pago".into(),
                        ));
                    }
                }
                Err(e) => set_status.set(CheckoutStatus::Failed(e)),
            }
        });
    };

    view! {
        <div class="checkout">
            <h1>"Tu carrito"</h1>

            <Show
                when=move || cart.count() > 0
                fallback=|| view! {
                    <p class="empty">"Tu carrito está vacío. " <a href="/">"Ver productos"</a></p>
                }
            >
                <div class="cart-items">
                    <For
                        each=move || cart.items.get()
                        key=|item| format!("{}-{}", item.id, item.qty)
                        children=move |item| view! { <CartRow item=item /> }
                    />
                </div>
                <p class="total">"Total: " {move || format_price(cart.total())}</p>

                <form class="customer" on:submit=|ev| ev.prevent_default()>
                    <div class="field">
                        <label>"Correo"</label>
                        <input
                            type="email"
                            prop:value=move || email.get()
                            on:input=move |ev| set_email.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="field">
                        <label>"Nombre"</label>
                        <input
                            type="text"
                            prop:value=move || name.get()
                            on:input=move |ev| set_name.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="field">
                        <label>"Teléfono"</label>
                        <input
                            type="tel"
                            prop:value=move || phone.get()
                            on:input=move |ev| set_phone.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="field">
                        <label>"Dirección"</label>
                        <textarea
                            prop:value=move || address.get()
                            on:input=move |ev| set_address.set(event_target_value(&ev))
                        />
                    </div>
                </form>

                {move || match status.get() {
                    CheckoutStatus::Failed(message) => Some(view! { <p class="error">{message}</p> }),
                    _ => None,
                }}

                <button
                    class="btn btn-primary"
                    on:click=pay
                    disabled=move || status.with(CheckoutStatus::is_busy)
                >
                    {move || match status.get() {
                        CheckoutStatus::Submitting => "Procesando...",
                        CheckoutStatus::Redirecting => "Redirigiendo...",
                        _ => "Pagar",
                    }}
                </button>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_states() {
        assert!(!CheckoutStatus::Idle.is_busy());
        assert!(CheckoutStatus::Submitting.is_busy());
        assert!(CheckoutStatus::Redirecting.is_busy());
        assert!(!CheckoutStatus::Failed("boom".into()).is_busy());
    }
}

//! UI Components

use cart_core::CartItem;
use leptos::prelude::*;

use crate::catalog::Product;
use crate::state::{format_price, use_cart};

/// Top bar with the cart counter
#[component]
pub fn NavBar() -> impl IntoView {
    let cart = use_cart();

    view! {
        <nav class="navbar">
            <a href="/" class="brand">"Happy & Healthy Pets"</a>
            <a href="/checkout" class="cart-link">
                "Carrito"
                <Show when=move || cart.count() > 0>
                    <span class="cart-count">{move || cart.count()}</span>
                </Show>
            </a>
        </nav>
    }
}

/// Catalog entry with an add button
#[component]
pub fn ProductCard(product: Product) -> impl IntoView {
    let cart = use_cart();
    let Product {
        id,
        name,
        blurb,
        price,
    } = product;

    view! {
        <div class="product">
            <h3>{name}</h3>
            <p class="blurb">{blurb}</p>
            <p class="price">{format_price(price)}</p>
            <button class="btn btn-primary" on:click=move |_| cart.add(id, name, price)>
                "Agregar al carrito"
            </button>
        </div>
    }
}

/// Cart line with quantity controls
#[component]
pub fn CartRow(item: CartItem) -> impl IntoView {
    let cart = use_cart();
    let (dec_id, inc_id, rm_id) = (item.id.clone(), item.id.clone(), item.id.clone());

    view! {
        <div class="cart-row">
            <span class="name">{item.name.clone()}</span>
            <span class="unit-price">{format_price(item.price)}</span>
            <div class="qty">
                <button on:click=move |_| cart.set_quantity(&dec_id, -1)>"-"</button>
                <span>{item.qty}</span>
                <button on:click=move |_| cart.set_quantity(&inc_id, 1)>"+"</button>
            </div>
            <span class="line-total">{format_price(item.line_total())}</span>
            <button class="remove" on:click=move |_| cart.remove(&rm_id)>"Eliminar"</button>
        </div>
    }
}

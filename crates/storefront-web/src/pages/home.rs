//! Home Page

use leptos::prelude::*;

use crate::catalog;
use crate::components::ProductCard;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home">
            <header class="hero">
                <h1>"Happy & Healthy Pets"</h1>
                <p class="tagline">"Suplementos naturales para perros y gatos"</p>
            </header>

            <section class="catalog">
                {catalog::products()
                    .into_iter()
                    .map(|product| view! { <ProductCard product=product /> })
                    .collect_view()}
            </section>
        </div>
    }
}

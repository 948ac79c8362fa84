//! UI Components

use leptos::prelude::*;

use finmentor_core::ChatMessage;
use finmentor_core::markdown::{self, Block, Inline, Spans};
use portfolio_advisor::{Allocation, chart_slices, pie_paths};

/// Message bubble component
#[component]
pub fn MessageBubble(message: ChatMessage) -> impl IntoView {
    let is_user = message.is_user();
    let class = format!("message message-{}", message.role);
    let author = if is_user { "You" } else { "FinMentor AI" };
    let time = message.timestamp.format("%H:%M").to_string();

    view! {
        <div class=class>
            <strong class="author">{author}</strong>
            {message.image.map(|src| view! {
                <img class="visualization" src=src alt="Generated Visualization" />
            })}
            <div class="content">
                <Markdown text=message.text />
            </div>
            <span class="time">{time}</span>
        </div>
    }
}

/// Render the supported markdown subset
#[component]
pub fn Markdown(#[prop(into)] text: String) -> impl IntoView {
    markdown::render(&text)
        .into_iter()
        .map(block_view)
        .collect_view()
}

fn block_view(block: Block) -> AnyView {
    match block {
        Block::Heading1(spans) => view! { <h1>{spans_view(spans)}</h1> }.into_any(),
        Block::Heading2(spans) => view! { <h2>{spans_view(spans)}</h2> }.into_any(),
        Block::Paragraph(spans) => view! { <p>{spans_view(spans)}</p> }.into_any(),
        Block::List(items) => view! {
            <ul>
                {items
                    .into_iter()
                    .map(|item| view! { <li>{spans_view(item)}</li> })
                    .collect_view()}
            </ul>
        }
        .into_any(),
        Block::Table { headers, rows } => view! {
            <div class="table-wrap">
                <table>
                    <thead>
                        <tr>
                            {headers
                                .into_iter()
                                .map(|h| view! { <th>{spans_view(h)}</th> })
                                .collect_view()}
                        </tr>
                    </thead>
                    <tbody>
                        {rows
                            .into_iter()
                            .map(|row| view! {
                                <tr>
                                    {row
                                        .into_iter()
                                        .map(|cell| view! { <td>{spans_view(cell)}</td> })
                                        .collect_view()}
                                </tr>
                            })
                            .collect_view()}
                    </tbody>
                </table>
            </div>
        }
        .into_any(),
    }
}

fn spans_view(spans: Spans) -> impl IntoView {
    spans
        .into_iter()
        .map(|span| match span {
            Inline::Text(text) => text.into_any(),
            Inline::Bold(text) => view! { <strong>{text}</strong> }.into_any(),
        })
        .collect_view()
}

/// Allocation pie chart with legend
#[component]
pub fn PieChart(allocations: Vec<Allocation>) -> impl IntoView {
    let slices = chart_slices(&allocations);
    let paths = pie_paths(&slices);

    view! {
        <div class="pie-chart">
            <svg viewBox="-1 -1 2 2" style="transform: rotate(-90deg)">
                {paths
                    .into_iter()
                    .map(|p| view! { <path d=p.d fill=p.color /> })
                    .collect_view()}
            </svg>
            <ul class="legend">
                {slices
                    .into_iter()
                    .map(|s| view! {
                        <li>
                            <span class="swatch" style=format!("background-color: {}", s.color)></span>
                            {format!("{} ({}%)", s.name, s.value.normalize())}
                        </li>
                    })
                    .collect_view()}
            </ul>
        </div>
    }
}

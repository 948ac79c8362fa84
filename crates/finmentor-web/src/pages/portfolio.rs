//! Portfolio Generator Page

use leptos::prelude::*;
use leptos::task::spawn_local;

use portfolio_advisor::{
    INVESTMENT_TOOLS, PortfolioAnalysis, PortfolioInput, RiskAppetite, format_inr, parse_amount,
    totals,
};

use crate::api;
use crate::components::{Markdown, PieChart};

fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// AI chart image for the analysis on screen
///
/// Each new analysis bumps `generation`, so a render that finishes after
/// the user generated again is dropped instead of landing on the new one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct ChartState {
    generation: u64,
    image: Option<String>,
    loading: bool,
}

impl ChartState {
    fn reset(&mut self) {
        self.generation += 1;
        self.image = None;
        self.loading = false;
    }

    /// Ticket for a new render, `None` while one is already running
    fn begin(&mut self) -> Option<u64> {
        if self.loading {
            return None;
        }
        self.loading = true;
        Some(self.generation)
    }

    /// Store a finished render. Returns false if the ticket is stale.
    fn complete(&mut self, ticket: u64, image: Option<String>) -> bool {
        if ticket != self.generation {
            return false;
        }
        self.image = image;
        self.loading = false;
        true
    }
}

#[component]
pub fn PortfolioPage() -> impl IntoView {
    let form = RwSignal::new(PortfolioInput::default());
    let (capital, set_capital) = signal(String::new());
    let (monthly, set_monthly) = signal(String::new());
    let (loading, set_loading) = signal(false);
    let (analysis, set_analysis) = signal(None::<PortfolioAnalysis>);
    let (form_error, set_form_error) = signal(None::<String>);
    let chart = RwSignal::new(ChartState::default());

    let amounts_empty =
        move || form.with(|f| f.initial_capital.is_zero() && f.monthly_investment.is_zero());

    let generate = move |_| {
        if loading.get_untracked() {
            return;
        }
        let input = form.get_untracked();

        set_loading.set(true);
        set_analysis.set(None);
        set_form_error.set(None);
        chart.update(ChartState::reset);

        spawn_local(async move {
            match api::generate_portfolio(&input).await {
                Ok(result) => set_analysis.set(Some(result)),
                Err(message) => set_form_error.set(Some(message)),
            }
            set_loading.set(false);
        });
    };

    let render_chart = move |_: leptos::ev::MouseEvent| {
        let Some(current) = analysis.get_untracked() else {
            return;
        };
        let mut ticket = None;
        chart.update(|c| ticket = c.begin());
        let Some(ticket) = ticket else {
            return;
        };
        spawn_local(async move {
            let image = api::portfolio_chart(&current).await;
            chart.update(|c| {
                if !c.complete(ticket, image) {
                    web_sys::console::log_1(&"Dropped chart image for a previous analysis".into());
                }
            });
        });
    };

    view! {
        <div class="portfolio">
            <h1>"Portfolio Generator"</h1>

            <section class="form">
                <div class="field">
                    <label>"One-Time Capital (₹)"</label>
                    <input
                        type="text"
                        placeholder="e.g., 50000"
                        prop:value=move || capital.get()
                        on:input=move |ev| {
                            let digits = digits_only(&event_target_value(&ev));
                            form.update(|f| f.initial_capital = parse_amount(&digits));
                            set_capital.set(digits);
                        }
                    />
                </div>
                <div class="field">
                    <label>"Monthly SIP (₹)"</label>
                    <input
                        type="text"
                        placeholder="e.g., 10000"
                        prop:value=move || monthly.get()
                        on:input=move |ev| {
                            let digits = digits_only(&event_target_value(&ev));
                            form.update(|f| f.monthly_investment = parse_amount(&digits));
                            set_monthly.set(digits);
                        }
                    />
                </div>

                <div class="field">
                    <label>"Preferred Investment Tools"</label>
                    <div class="toggles">
                        {INVESTMENT_TOOLS
                            .into_iter()
                            .map(|tool| view! {
                                <button
                                    class:selected=move || form.with(|f| f.preferred_tools.contains(tool))
                                    on:click=move |_| form.update(|f| f.toggle_tool(tool))
                                >
                                    {tool}
                                </button>
                            })
                            .collect_view()}
                    </div>
                </div>

                <div class="field">
                    <label>"Risk Appetite"</label>
                    <div class="segmented">
                        {RiskAppetite::ALL
                            .into_iter()
                            .map(|level| view! {
                                <button
                                    class:active=move || form.with(|f| f.risk_appetite == level)
                                    on:click=move |_| form.update(|f| f.risk_appetite = level)
                                >
                                    {level.as_str()}
                                </button>
                            })
                            .collect_view()}
                    </div>
                </div>

                <button
                    class="generate"
                    on:click=generate
                    disabled=move || loading.get() || amounts_empty()
                >
                    {move || if loading.get() { "Generating..." } else { "Generate Smart Portfolio" }}
                </button>

                {move || form_error.get().map(|e| view! { <p class="form-error">{e}</p> })}
            </section>

            <Show when=move || loading.get() || analysis.with(Option::is_some)>
                <section class="results">
                    <h2>"AI Analysis & Allocation"</h2>
                    <Show when=move || loading.get()>
                        <div class="spinner">"..."</div>
                    </Show>
                    {move || analysis.get().map(|a| {
                        if a.is_failed() {
                            view! {
                                <div class="analysis-error">
                                    <h3>"Analysis Error"</h3>
                                    <p>{a.rationale}</p>
                                </div>
                            }
                            .into_any()
                        } else {
                            view! {
                                <AnalysisResult analysis=a chart=chart on_render_chart=render_chart />
                            }
                            .into_any()
                        }
                    })}
                </section>
            </Show>
        </div>
    }
}

#[component]
fn AnalysisResult(
    analysis: PortfolioAnalysis,
    chart: RwSignal<ChartState>,
    on_render_chart: impl Fn(leptos::ev::MouseEvent) + Send + 'static,
) -> impl IntoView {
    let chart_loading = move || chart.with(|c| c.loading);

    let (lump_total, sip_total) = totals(&analysis.allocations);

    view! {
        <div class="analysis">
            <div class="chart">
                <PieChart allocations=analysis.allocations.clone() />
                <button on:click=on_render_chart disabled=chart_loading>
                    {move || if chart_loading() { "Rendering..." } else { "Render with AI" }}
                </button>
                {move || chart.with(|c| c.image.clone()).map(|src| view! {
                    <img class="visualization" src=src alt="Generated Visualization" />
                })}
            </div>

            <div class="summary">
                <h3>"Investment Rationale"</h3>
                <Markdown text=analysis.rationale />
                <h3>"Projected Annual Return"</h3>
                <p class="projected-return">{analysis.projected_return}</p>
            </div>

            <h3>"Detailed Allocation Plan"</h3>
            <table class="allocations">
                <thead>
                    <tr>
                        <th>"Asset"</th>
                        <th>"Allocation"</th>
                        <th>"Lump Sum (₹)"</th>
                        <th>"Monthly SIP (₹)"</th>
                        <th>"Key Metrics"</th>
                    </tr>
                </thead>
                <tbody>
                    {analysis
                        .allocations
                        .into_iter()
                        .map(|a| view! {
                            <tr>
                                <td>{a.name}</td>
                                <td>{format!("{}%", a.percentage.normalize())}</td>
                                <td class="amount">{format_inr(a.lump_sum)}</td>
                                <td class="amount">{format_inr(a.sip)}</td>
                                <td class="metrics">{a.metrics}</td>
                            </tr>
                        })
                        .collect_view()}
                </tbody>
                <tfoot>
                    <tr>
                        <td colspan="2">"Total"</td>
                        <td class="amount">{format_inr(lump_total)}</td>
                        <td class="amount">{format_inr(sip_total)}</td>
                        <td></td>
                    </tr>
                </tfoot>
            </table>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("50,000"), "50000");
        assert_eq!(digits_only("₹ 1.5k"), "15");
        assert_eq!(digits_only(""), "");
    }

    #[test]
    fn test_chart_render_completes() {
        let mut chart = ChartState::default();
        let ticket = chart.begin().unwrap();
        assert!(chart.loading);
        assert_eq!(chart.begin(), None);

        assert!(chart.complete(ticket, Some("data:image/png;base64,AA==".into())));
        assert!(!chart.loading);
        assert_eq!(chart.image.as_deref(), Some("data:image/png;base64,AA=="));
    }

    #[test]
    fn test_chart_from_previous_analysis_dropped() {
        let mut chart = ChartState::default();
        let stale = chart.begin().unwrap();

        // User generates a new portfolio while the render is in flight
        chart.reset();
        assert!(!chart.loading);

        assert!(!chart.complete(stale, Some("data:image/png;base64,old".into())));
        assert_eq!(chart.image, None);

        let ticket = chart.begin().unwrap();
        assert!(chart.complete(ticket, None));
        assert_eq!(chart.image, None);
        assert!(!chart.loading);
    }
}

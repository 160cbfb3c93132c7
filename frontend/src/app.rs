use log::{debug, error};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use temperature_converter_model::{
    api::{ConvertRequest, HistoryEntry},
    converter::parse_value,
    format, Unit, RECENT_LIMIT,
};

use crate::api;

// The value shown when the page first loads.
const INITIAL_INPUT: &str = "25.0";

// Shown when the user acts before the session has been opened.
const NOT_CONNECTED: &str = "Not connected yet";

#[derive(Default, Properties, PartialEq)]
pub struct Props;

enum Notice {
    Error(String),
    Cleared,
}

pub struct App {
    session_id: Option<String>,
    input: String,
    unit: Unit,
    result: Option<HistoryEntry>,
    history: Vec<HistoryEntry>,
    notice: Option<Notice>,
}

pub enum Message {
    SessionOpened { session_id: String },
    InputChanged { input: String },
    UnitChanged { unit: Unit },
    Convert,
    Converted { entry: HistoryEntry },
    HistoryLoaded { entries: Vec<HistoryEntry> },
    Clear,
    Cleared,
    Failed { error: String },
}

impl App {
    // The open session, or a notice saying there is none yet.
    fn connected_session(&mut self) -> Option<String> {
        if self.session_id.is_none() {
            self.notice = Some(Notice::Error(NOT_CONNECTED.to_string()));
        }
        self.session_id.clone()
    }

    fn load_history(ctx: &Context<Self>, session_id: String) {
        ctx.link().send_future(async move {
            match api::history(&session_id).await {
                Ok(entries) => Message::HistoryLoaded { entries },
                Err(e) => Message::Failed {
                    error: e.to_string(),
                },
            }
        });
    }

    fn view_result(&self) -> Html {
        let Some(entry) = &self.result else {
            return html! {};
        };
        let to = &entry.record.to;
        html! {
            <section class="card">
                <h2>{ "Result" }</h2>
                <div class="output-number">{ format!("{} {}", format(to.value), to.unit.symbol()) }</div>
                <p>{ entry.record.from.to_string() }{ " → " }{ to.to_string() }</p>
            </section>
        }
    }

    fn view_history(&self, ctx: &Context<Self>) -> Html {
        let entries = if self.history.is_empty() {
            html! { <p class="info">{ "No conversions yet" }</p> }
        } else {
            html! {
                <ul>
                    { for self.history.iter().take(RECENT_LIMIT).map(|entry| html! {
                        <li>{ entry.line.clone() }</li>
                    }) }
                </ul>
            }
        };

        let onclick = ctx.link().callback(|_: MouseEvent| Message::Clear);

        html! {
            <section class="card">
                <h2>{ "History" }</h2>
                { entries }
                <button onclick={onclick}>{ "Clear history" }</button>
            </section>
        }
    }

    fn view_notice(&self) -> Html {
        match &self.notice {
            Some(Notice::Error(error)) => html! { <p class="error">{ error.clone() }</p> },
            Some(Notice::Cleared) => html! { <p class="warning">{ "History cleared" }</p> },
            None => html! {},
        }
    }
}

impl Component for App {
    type Message = Message;

    type Properties = Props;

    fn create(ctx: &Context<Self>) -> Self {
        // Every page load is its own session with its own history.
        ctx.link().send_future(async {
            match api::open_session().await {
                Ok(session_id) => Message::SessionOpened { session_id },
                Err(e) => Message::Failed {
                    error: e.to_string(),
                },
            }
        });

        Self {
            session_id: None,
            input: INITIAL_INPUT.to_string(),
            unit: Unit::default(),
            result: None,
            history: Vec::new(),
            notice: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Message::SessionOpened { session_id } => {
                debug!("Opened session {session_id}");
                Self::load_history(ctx, session_id.clone());
                self.session_id = Some(session_id);
                false
            }

            Message::InputChanged { input } => {
                self.input = input;
                false
            }

            Message::UnitChanged { unit } => {
                self.unit = unit;
                true
            }

            Message::Convert => {
                let value = match parse_value(&self.input) {
                    Ok(value) => value,
                    Err(e) => {
                        self.notice = Some(Notice::Error(e.to_string()));
                        return true;
                    }
                };
                let Some(session_id) = self.connected_session() else {
                    return true;
                };

                let request = ConvertRequest {
                    value,
                    unit: self.unit,
                };
                ctx.link().send_future(async move {
                    match api::convert(&session_id, &request).await {
                        Ok(entry) => Message::Converted { entry },
                        Err(e) => Message::Failed {
                            error: e.to_string(),
                        },
                    }
                });
                self.notice = None;
                true
            }

            Message::Converted { entry } => {
                self.result = Some(entry);
                if let Some(session_id) = self.session_id.clone() {
                    Self::load_history(ctx, session_id);
                }
                true
            }

            Message::HistoryLoaded { entries } => {
                self.history = entries;
                true
            }

            Message::Clear => {
                let Some(session_id) = self.connected_session() else {
                    return true;
                };
                ctx.link().send_future(async move {
                    match api::clear(&session_id).await {
                        Ok(()) => Message::Cleared,
                        Err(e) => Message::Failed {
                            error: e.to_string(),
                        },
                    }
                });
                false
            }

            Message::Cleared => {
                self.history.clear();
                self.result = None;
                self.notice = Some(Notice::Cleared);
                true
            }

            Message::Failed { error } => {
                error!("Request failed: {error}");
                self.notice = Some(Notice::Error(error));
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let on_input = ctx.link().callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Message::InputChanged {
                input: input.value(),
            }
        });

        let on_unit_change = ctx.link().batch_callback(|e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            select
                .value()
                .parse::<Unit>()
                .ok()
                .map(|unit| Message::UnitChanged { unit })
        });

        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Message::Convert
        });

        html! {
            <main>
                <section class="card">
                    <h1>{ "🌡 C/F Temperature Converter" }</h1>
                    <p>{ "Convert temperatures between °C and °F, keeping a history of what you converted." }</p>
                </section>
                <section class="card">
                    <form onsubmit={onsubmit}>
                        <label for="value">{ "Temperature" }</label>
                        <input type="number" id="value" step="0.1" value={self.input.clone()} oninput={on_input} />
                        <label for="unit">{ "From" }</label>
                        <select id="unit" onchange={on_unit_change}>
                            { for Unit::ALL.into_iter().map(|unit| html! {
                                <option value={unit.code()} selected={unit == self.unit}>{ unit.label() }</option>
                            }) }
                        </select>
                        <p>{ format!("To {}", self.unit.other().label()) }</p>
                        <input type="submit" value="Convert" />
                    </form>
                    { self.view_notice() }
                </section>
                { self.view_result() }
                { self.view_history(ctx) }
            </main>
        }
    }
}

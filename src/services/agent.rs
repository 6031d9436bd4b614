// src/services/agent.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::info;

use super::promise::{
    PaymentIntent, PromiseCase, Step, date_accepted, date_candidate, parse_amount,
    payment_channel, register_promise, validate_commitment_date,
};
use super::session_manager::Turn;
use crate::error::{AgentError, PromiseRejection};

const ID_LEN: usize = 10;

const ASK_ID: &str = "Para revisar tu caso necesito tu cédula o ID de cliente.";
const ASK_CAUSE: &str = "¿Cuál es la causa principal del atraso?";
const ASK_AMOUNT: &str = "¿Cuánto podrías pagar (monto aproximado)?";
const ASK_DATE: &str = "¿En qué fecha concreta podrías pagar? Usa el formato YYYY-MM-DD.";
const ASK_CHANNEL: &str = "¿Por qué canal pagarás? (transferencia, ventanilla, tarjeta u otro)";

/// Produces the bot reply for one user message.
#[async_trait]
pub trait Responder: Send + Sync {
    /// `history` already ends with the user turn for `message`. Returns the
    /// reply together with the case as it stands after this turn.
    async fn respond(
        &self,
        message: &str,
        history: &[Turn],
        case: PromiseCase,
    ) -> Result<(String, PromiseCase), AgentError>;
}

#[derive(Clone, Debug)]
pub struct DemoClient {
    pub name: String,
    pub id: String,
    pub debt: f64,
}

/// Rule-based collections assistant over an in-memory client table.
///
/// Walks one conversation through id, cause, amount, date, channel and
/// confirmation, then registers a simulated payment promise.
#[derive(Clone, Debug)]
pub struct DemoCollectionsAgent {
    clients: HashMap<String, DemoClient>,
    today: Option<NaiveDate>,
}

impl Default for DemoCollectionsAgent {
    fn default() -> Self {
        Self::new(vec![DemoClient {
            name: "Diego Sebastián Jiménez Coronel".to_string(),
            id: "0957380330".to_string(),
            debt: 450.0,
        }])
    }
}

impl DemoCollectionsAgent {
    pub fn new(clients: Vec<DemoClient>) -> Self {
        Self {
            clients: clients.into_iter().map(|c| (c.id.clone(), c)).collect(),
            today: None,
        }
    }

    /// Pins the date used to judge commitment dates.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn lookup_debt(&self, id: &str) -> Option<String> {
        self.clients.get(id).map(|client| {
            format!(
                "Cliente: {}\nCédula: {}\nDeuda demo: ${:.2}",
                client.name, client.id, client.debt
            )
        })
    }

    fn ask_id(&self, message: &str, mut case: PromiseCase) -> (String, PromiseCase) {
        let Some(id) = find_client_id(message) else {
            return (ASK_ID.to_string(), case);
        };
        match self.lookup_debt(id) {
            Some(summary) => {
                case.client_id = Some(id.to_string());
                case.step = Step::AskingCause;
                (format!("Gracias. {}\n{}", summary, ASK_CAUSE), case)
            }
            None => (format!("No encontré al cliente {} en la BD demo.", id), case),
        }
    }

    fn ask_date(&self, message: &str, mut case: PromiseCase) -> (String, PromiseCase) {
        let today = self.today();
        match validate_commitment_date(date_candidate(message), today) {
            Ok(date) => {
                case.date = Some(date);
                case.intent = Some(PaymentIntent::from_lead_days((date - today).num_days()));
                case.step = Step::AskingChannel;
                (format!("{}\n{}", date_accepted(date), ASK_CHANNEL), case)
            }
            Err(rejection) => (format!("{}\n{}", rejection, ASK_DATE), case),
        }
    }
}

/// First standalone run of exactly ten digits.
pub fn find_client_id(message: &str) -> Option<&str> {
    message
        .split(|c: char| !c.is_ascii_digit())
        .find(|token| token.len() == ID_LEN)
}

enum Answer {
    Yes,
    No,
    Unclear,
}

fn read_answer(message: &str) -> Answer {
    let lower = message.to_lowercase();
    let words: Vec<&str> = lower.split(|c: char| !c.is_alphanumeric()).collect();
    if words.contains(&"no") {
        Answer::No
    } else if words
        .iter()
        .any(|w| matches!(*w, "sí" | "si" | "confirmo" | "ok" | "claro" | "dale"))
    {
        Answer::Yes
    } else {
        Answer::Unclear
    }
}

fn summary(case: &PromiseCase) -> String {
    format!(
        "Resumen de tu compromiso: monto ${:.2}, fecha {}, canal {}. ¿Confirmas? (sí/no)",
        case.amount.unwrap_or_default(),
        case.date.map(|d| d.to_string()).unwrap_or_default(),
        case.channel.as_deref().unwrap_or("otro"),
    )
}

fn confirm(mut case: PromiseCase) -> Result<(String, PromiseCase), AgentError> {
    let (Some(client_id), Some(amount), Some(date)) = (case.client_id.clone(), case.amount, case.date)
    else {
        return Err(AgentError::Unavailable("promise confirmed before it was complete".to_string()));
    };

    let date = date.to_string();
    match register_promise(&client_id, amount, &date, case.cause.as_deref().unwrap_or_default()) {
        Ok((promise_id, receipt)) => {
            info!(
                client_id,
                promise_id,
                intent = case.intent.map(PaymentIntent::as_str),
                channel = case.channel.as_deref(),
                "payment promise registered"
            );
            case.promise_id = Some(promise_id);
            case.step = Step::Closed;
            Ok((
                format!("{}\nGracias, te recordaremos tu pago el {}.", receipt, date),
                case,
            ))
        }
        Err(rejection) => {
            case.step = Step::AskingAmount;
            Ok((format!("{}\n{}", rejection, ASK_AMOUNT), case))
        }
    }
}

#[async_trait]
impl Responder for DemoCollectionsAgent {
    async fn respond(
        &self,
        message: &str,
        _history: &[Turn],
        mut case: PromiseCase,
    ) -> Result<(String, PromiseCase), AgentError> {
        let step = case.step;
        let turn = match step {
            Step::AskingId => self.ask_id(message, case),
            Step::AskingCause => {
                case.cause = Some(message.to_string());
                case.step = Step::AskingAmount;
                (format!("Entiendo, gracias por contarme. {}", ASK_AMOUNT), case)
            }
            Step::AskingAmount => match parse_amount(message) {
                Some(amount) if amount > 0.0 => {
                    case.amount = Some(amount);
                    case.step = Step::AskingDate;
                    (ASK_DATE.to_string(), case)
                }
                Some(_) => (format!("{}\n{}", PromiseRejection::NonPositiveAmount, ASK_AMOUNT), case),
                None => (format!("No entendí el monto. {}", ASK_AMOUNT), case),
            },
            Step::AskingDate => self.ask_date(message, case),
            Step::AskingChannel => {
                case.channel = Some(payment_channel(message).to_string());
                case.step = Step::AskingConfirmation;
                (summary(&case), case)
            }
            Step::AskingConfirmation => match read_answer(message) {
                Answer::Yes => return confirm(case),
                Answer::No => {
                    case.step = Step::AskingAmount;
                    (format!("De acuerdo, revisemos de nuevo. {}", ASK_AMOUNT), case)
                }
                Answer::Unclear => (summary(&case), case),
            },
            Step::Closed => {
                let date = case.date.map(|d| d.to_string()).unwrap_or_default();
                (
                    format!("Tu promesa de pago ya está registrada para el {}. ¡Gracias!", date),
                    case,
                )
            }
        };
        Ok(turn)
    }
}

//! Reply language detection and localized router phrases
//!
//! Detection is a lightweight stopword heuristic over the utterance; the
//! canned router phrases (clarifying questions, unavailability notices)
//! are localized here so the guard branch never depends on the model.

use crate::agents::domain::{Language, TravelFacet, TripField};

const ENGLISH: &[&str] = &[
    "i", "the", "to", "want", "go", "from", "trip", "travel", "would", "like", "please", "my",
];
const ITALIAN: &[&str] = &[
    "io", "voglio", "andare", "viaggio", "vorrei", "partire", "da", "per", "una", "settimana",
    "giorni", "grazie",
];
const SPANISH: &[&str] = &[
    "yo", "quiero", "viajar", "viaje", "ir", "desde", "hasta", "una", "semana", "días", "gracias",
    "quisiera",
];
const FRENCH: &[&str] = &[
    "je", "veux", "voyage", "aller", "partir", "depuis", "vers", "une", "semaine", "jours",
    "merci", "voudrais",
];
const GERMAN: &[&str] = &[
    "ich", "möchte", "reise", "reisen", "nach", "von", "eine", "woche", "tage", "danke", "bitte",
    "gerne",
];

/// Detect the utterance language. Returns `None` when inconclusive; the
/// caller keeps the previous language or falls back to English.
pub fn detect(utterance: &str) -> Option<Language> {
    let words: Vec<String> = utterance
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphabetic())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();

    let candidates = [
        (Language::English, ENGLISH),
        (Language::Italian, ITALIAN),
        (Language::Spanish, SPANISH),
        (Language::French, FRENCH),
        (Language::German, GERMAN),
    ];

    let mut best: Option<(Language, usize)> = None;
    for (language, stopwords) in candidates {
        let score = words
            .iter()
            .filter(|w| stopwords.contains(&w.as_str()))
            .count();
        if score > 0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((language, score));
        }
    }

    best.map(|(language, _)| language)
}

/// Localized name of a trip field, for clarifying questions
fn field_name(field: TripField, language: Language) -> &'static str {
    match (language, field) {
        (Language::English, TripField::Origin) => "departure city",
        (Language::English, TripField::Destination) => "destination",
        (Language::English, TripField::Dates) => "travel dates",
        (Language::English, TripField::Duration) => "trip duration",
        (Language::English, TripField::Budget) => "budget range",
        (Language::Italian, TripField::Origin) => "città di partenza",
        (Language::Italian, TripField::Destination) => "destinazione",
        (Language::Italian, TripField::Dates) => "date del viaggio",
        (Language::Italian, TripField::Duration) => "durata del viaggio",
        (Language::Italian, TripField::Budget) => "budget",
        (Language::Spanish, TripField::Origin) => "ciudad de salida",
        (Language::Spanish, TripField::Destination) => "destino",
        (Language::Spanish, TripField::Dates) => "fechas del viaje",
        (Language::Spanish, TripField::Duration) => "duración del viaje",
        (Language::Spanish, TripField::Budget) => "presupuesto",
        (Language::French, TripField::Origin) => "ville de départ",
        (Language::French, TripField::Destination) => "destination",
        (Language::French, TripField::Dates) => "dates du voyage",
        (Language::French, TripField::Duration) => "durée du voyage",
        (Language::French, TripField::Budget) => "budget",
        (Language::German, TripField::Origin) => "Abflugort",
        (Language::German, TripField::Destination) => "Reiseziel",
        (Language::German, TripField::Dates) => "Reisedaten",
        (Language::German, TripField::Duration) => "Reisedauer",
        (Language::German, TripField::Budget) => "Budget",
    }
}

/// Localized facet label, for unavailability notices
fn facet_name(facet: TravelFacet, language: Language) -> &'static str {
    match (language, facet) {
        (Language::English, TravelFacet::Flight) => "flight",
        (Language::English, TravelFacet::Hotel) => "hotel",
        (Language::English, TravelFacet::Activities) => "activities",
        (Language::Italian, TravelFacet::Flight) => "voli",
        (Language::Italian, TravelFacet::Hotel) => "hotel",
        (Language::Italian, TravelFacet::Activities) => "attività",
        (Language::Spanish, TravelFacet::Flight) => "vuelos",
        (Language::Spanish, TravelFacet::Hotel) => "hoteles",
        (Language::Spanish, TravelFacet::Activities) => "actividades",
        (Language::French, TravelFacet::Flight) => "vols",
        (Language::French, TravelFacet::Hotel) => "hôtels",
        (Language::French, TravelFacet::Activities) => "activités",
        (Language::German, TravelFacet::Flight) => "Flüge",
        (Language::German, TravelFacet::Hotel) => "Hotels",
        (Language::German, TravelFacet::Activities) => "Aktivitäten",
    }
}

/// Deterministic clarifying question listing the missing fields
pub fn clarifying_question(missing: &[TripField], language: Language) -> String {
    let list = missing
        .iter()
        .map(|f| field_name(*f, language))
        .collect::<Vec<_>>()
        .join(", ");

    match language {
        Language::English => format!(
            "To plan your trip I still need: {}. Could you share these details?",
            list
        ),
        Language::Italian => format!(
            "Per organizzare il viaggio mi servono ancora: {}. Puoi indicarmeli?",
            list
        ),
        Language::Spanish => format!(
            "Para planear tu viaje todavía necesito: {}. ¿Puedes indicármelos?",
            list
        ),
        Language::French => format!(
            "Pour organiser votre voyage, il me manque encore : {}. Pouvez-vous les préciser ?",
            list
        ),
        Language::German => format!(
            "Für die Reiseplanung fehlen mir noch: {}. Kannst du sie mir nennen?",
            list
        ),
    }
}

/// Explicit notice that one facet's information is unavailable
pub fn unavailable_notice(facet: TravelFacet, language: Language) -> String {
    let name = facet_name(facet, language);
    match language {
        Language::English => format!("Note: {} information is currently unavailable.", name),
        Language::Italian => format!("Nota: le informazioni su {} non sono al momento disponibili.", name),
        Language::Spanish => format!("Nota: la información de {} no está disponible en este momento.", name),
        Language::French => format!("Remarque : les informations sur les {} sont indisponibles pour le moment.", name),
        Language::German => format!("Hinweis: Informationen zu {} sind derzeit nicht verfügbar.", name),
    }
}

/// Reply for a turn after a plan was delivered and nothing changed
pub fn plan_standing(language: Language) -> String {
    match language {
        Language::English => {
            "Your trip plan is ready. Tell me if you want to change any detail and I will update it."
                .to_string()
        }
        Language::Italian => {
            "Il piano di viaggio è pronto. Dimmi se vuoi modificare qualche dettaglio e lo aggiorno."
                .to_string()
        }
        Language::Spanish => {
            "Tu plan de viaje está listo. Dime si quieres cambiar algún detalle y lo actualizo."
                .to_string()
        }
        Language::French => {
            "Votre plan de voyage est prêt. Dites-moi si vous souhaitez modifier un détail et je le mettrai à jour."
                .to_string()
        }
        Language::German => {
            "Dein Reiseplan steht. Sag mir, wenn du ein Detail ändern möchtest, und ich passe ihn an."
                .to_string()
        }
    }
}

/// Apology used when a turn cannot be completed at all
pub fn turn_failed(language: Language) -> String {
    match language {
        Language::English => {
            "I could not retrieve travel information right now. Please try again shortly.".to_string()
        }
        Language::Italian => {
            "Al momento non riesco a recuperare le informazioni di viaggio. Riprova tra poco.".to_string()
        }
        Language::Spanish => {
            "Ahora mismo no puedo obtener la información del viaje. Inténtalo de nuevo en breve.".to_string()
        }
        Language::French => {
            "Je ne parviens pas à récupérer les informations de voyage pour le moment. Réessayez sous peu.".to_string()
        }
        Language::German => {
            "Ich kann die Reiseinformationen gerade nicht abrufen. Bitte versuche es gleich noch einmal.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_english_italian_and_spanish() {
        assert_eq!(detect("I want to go to Paris"), Some(Language::English));
        assert_eq!(detect("Voglio andare a Parigi"), Some(Language::Italian));
        assert_eq!(detect("Quiero viajar a París"), Some(Language::Spanish));
    }

    #[test]
    fn inconclusive_utterances_yield_none() {
        assert_eq!(detect("Paris 2026"), None);
        assert_eq!(detect(""), None);
    }

    #[test]
    fn clarifying_question_lists_missing_fields() {
        let missing = vec![TripField::Origin, TripField::Budget];
        let question = clarifying_question(&missing, Language::English);
        assert!(question.contains("departure city"));
        assert!(question.contains("budget range"));

        let question = clarifying_question(&missing, Language::Italian);
        assert!(question.contains("città di partenza"));
    }
}

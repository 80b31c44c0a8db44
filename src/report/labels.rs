//! Fixed label tables for the HTML report, one per supported language.

use chrono::Weekday;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    Eu,
    En,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" => Ok(Language::Es),
            "eu" => Ok(Language::Eu),
            "en" => Ok(Language::En),
            other => Err(format!("unsupported report language '{}'", other)),
        }
    }
}

/// Every user-visible string the renderer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub html_lang: &'static str,
    pub title: &'static str,
    pub last_updated: &'static str,
    pub historical_note: &'static str,
    pub current_note: &'static str,
    pub reference_date: &'static str,
    /// The time the alignment looked for.
    pub requested_time: &'static str,
    pub no_data: &'static str,
    pub fetch_failed: &'static str,
    pub no_forecast: &'static str,
    /// `{n}` is replaced with the horizon in days.
    pub forecast_heading: &'static str,
    pub stale_note: &'static str,
    pub unit: &'static str,
    weekdays: [&'static str; 7],
}

const SPANISH: Labels = Labels {
    html_lang: "es",
    title: "Pronóstico de Viento - Parques Eólicos",
    last_updated: "Última actualización",
    historical_note: "Comparativa con el mismo día y hora hace un año",
    current_note: "Dato disponible más cercano al momento actual",
    reference_date: "Fecha de referencia",
    requested_time: "Hora solicitada",
    no_data: "No hay datos disponibles para esta fecha",
    fetch_failed: "No se pudieron obtener los datos de este parque",
    no_forecast: "No hay pronóstico disponible",
    forecast_heading: "Pronóstico {n} días",
    stale_note: "El dato más cercano está lejos de la hora solicitada",
    unit: "m/s",
    weekdays: ["Lunes", "Martes", "Miércoles", "Jueves", "Viernes", "Sábado", "Domingo"],
};

const BASQUE: Labels = Labels {
    html_lang: "eu",
    title: "Haize Iragarpena - Parke Eolikoak",
    last_updated: "Azken eguneratzea",
    historical_note: "Duela urtebeteko egun eta ordu bereko datuekin alderaketa",
    current_note: "Une honetatik hurbilen dagoen informazioa",
    reference_date: "Erreferentzia data",
    requested_time: "Eskatutako ordua",
    no_data: "Ez dago daturik eskuragarri data honetarako",
    fetch_failed: "Ezin izan dira parke honen datuak eskuratu",
    no_forecast: "Ez dago iragarpen eskuragarririk estazio honetarako",
    forecast_heading: "{n} eguneko iragarpena",
    stale_note: "Datu hurbilena eskatutako ordutik urrun dago",
    unit: "m/s",
    weekdays: [
        "Astelehena",
        "Asteartea",
        "Asteazkena",
        "Osteguna",
        "Ostirala",
        "Larunbata",
        "Igandea",
    ],
};

const ENGLISH: Labels = Labels {
    html_lang: "en",
    title: "Wind Forecast - Wind Farms",
    last_updated: "Last updated",
    historical_note: "Compared with the same day and hour one year ago",
    current_note: "Closest available reading to the current time",
    reference_date: "Reference date",
    requested_time: "Requested time",
    no_data: "No data available for this date",
    fetch_failed: "Data for this wind farm could not be retrieved",
    no_forecast: "No forecast available",
    forecast_heading: "{n}-day forecast",
    stale_note: "The closest reading is far from the requested time",
    unit: "m/s",
    weekdays: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"],
};

impl Labels {
    pub fn for_language(language: Language) -> &'static Labels {
        match language {
            Language::Es => &SPANISH,
            Language::Eu => &BASQUE,
            Language::En => &ENGLISH,
        }
    }

    pub fn weekday(&self, day: Weekday) -> &'static str {
        self.weekdays[day.num_days_from_monday() as usize]
    }

    pub fn forecast_heading(&self, horizon_days: u32) -> String {
        self.forecast_heading.replace("{n}", &horizon_days.to_string())
    }
}

//! Detalle de gastos de una misión
//!
//! Cada elemento es un día de misión tal como lo envía el formulario de
//! retorno. Los importes llegan como números o como cadenas numéricas; los
//! valores ausentes o no numéricos cuentan como cero.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claves del formulario que entran en el total del día
pub const AMOUNT_KEYS: [&str; 6] = ["montantKm", "P_D", "repas", "diner", "logement", "montantdet"];

/// Un día del detalle de gastos (`détail_Frais`)
///
/// Se guarda el objeto enviado sin tocar, `null` incluidos: el historial de
/// finanzas devuelve exactamente lo que el empleado registró.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseDay(Map<String, Value>);

impl ExpenseDay {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// La fecha del día, si viene, es texto
    pub fn has_valid_date(&self) -> bool {
        matches!(self.get("date"), None | Some(Value::Null) | Some(Value::String(_)))
    }

    /// Suma de los seis importes del día
    pub fn total(&self) -> Decimal {
        AMOUNT_KEYS.iter().map(|key| amount(self.get(key))).sum()
    }
}

/// Interpretar un importe del formulario; cualquier cosa no numérica vale 0
pub fn amount(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .unwrap_or(Decimal::ZERO),
        Some(Value::String(s)) => {
            let normalized = s.trim().replace(',', ".");
            Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    }
}

/// Total general del detalle de gastos
pub fn grand_total(days: &[ExpenseDay]) -> Decimal {
    days.iter().map(ExpenseDay::total).sum()
}

/// Diferencia entre el coste real y el anticipo: positiva si se debe
/// dinero al empleado
pub fn difference(grand_total: Decimal, advance: Decimal) -> Decimal {
    grand_total - advance
}

/// Leer el documento almacenado. Acepta el array JSON o su forma serializada
/// como cadena (filas antiguas); un documento ilegible se trata como vacío.
pub fn parse_detail(mission_id: &str, stored: Option<&Value>) -> Vec<ExpenseDay> {
    let parsed = match stored {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::String(raw)) => serde_json::from_str::<Vec<ExpenseDay>>(raw),
        Some(value) => serde_json::from_value::<Vec<ExpenseDay>>(value.clone()),
    };

    parsed.unwrap_or_else(|e| {
        log::error!("❌ détail_Frais illisible pour la mission {}: {}", mission_id, e);
        Vec::new()
    })
}

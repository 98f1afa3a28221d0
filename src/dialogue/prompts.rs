//! Spoken prompts
//!
//! Prices are read as "53 con 90 soles".

use crate::cart::{Cart, RemoveOutcome};
use crate::menu::{Catalog, Category, MenuItem, Price};

pub const EMPTY_CART: &str = "Tu pedido está vacío.";
pub const NOTHING_TO_CONFIRM: &str = "Tu pedido está vacío. No hay nada que confirmar.";
pub const NAME_NOT_UNDERSTOOD: &str = "No pude entender tu nombre. Por favor, repítelo.";
pub const ITEM_NOT_FOUND: &str = "Lo siento, no pude encontrar ese plato. Por favor, repítelo.";
pub const REMOVE_NOT_UNDERSTOOD: &str = "No entendí qué plato deseas quitar.";
pub const ANYTHING_ELSE: &str = "¿Algo más, o \"finalizar pedido\"?";
pub const ADD_MORE: &str = "¿Algo más de esta sección, \"otra sección\", o \"finalizar pedido\"?";
pub const HELP: &str = "Puedes decir: \"quiero\" y el nombre del plato, \"quitar\" y el plato, \
    \"ver pedido\", \"cuánto es\", \"otra sección\", \"cancelar pedido\" o \"finalizar pedido\".";
pub const CONFIRMING: &str = "Confirmando tu pedido...";
pub const NOT_CONFIRMED: &str = "Pedido no confirmado. Puedes continuar añadiendo o quitando ítems.";
pub const YES_OR_NO: &str = "No entendí tu respuesta. Por favor, di \"sí\" o \"no\".";
pub const CART_CLEARED: &str = "Listo, vacié tu pedido. Puedes empezar de nuevo.";
pub const UNREACHABLE: &str =
    "Lo siento, no pude conectar con el servidor. Por favor, inténtalo de nuevo más tarde.";
pub const NO_SPEECH: &str = "No te escuché. Por favor, repite.";
pub const AUDIO_CAPTURE: &str =
    "No pude acceder al micrófono. Asegúrate de que esté conectado y permitido.";
pub const NOT_ALLOWED: &str =
    "El acceso al micrófono no está permitido. Por favor, habilítalo en la configuración.";
pub const LISTEN_ERROR: &str = "Lo siento, hubo un problema con el reconocimiento de voz.";
pub const ESCALATION: &str = "Parece que no logro entenderte. \
    Cuando quieras continuar, actívame de nuevo o pide ayuda al personal.";
pub const MENU_UNAVAILABLE: &str = "Lo siento, el menú no está disponible en este momento.";

pub fn greeting(restaurant: &str) -> String {
    format!("Hola. Bienvenido a {restaurant}, ¿Cuál es tu nombre?")
}

pub fn nice_to_meet(name: &str) -> String {
    format!("Mucho gusto, {name}.")
}

/// Spoken amount: "53 con 90 soles"
pub fn soles(price: Price) -> String {
    format!("{} soles", price.spoken())
}

/// Category names as a spoken list: "\"Brasa\", \"Broaster\" o \"Guarniciones\""
fn category_options(catalog: &Catalog) -> Option<String> {
    let names: Vec<String> = catalog
        .categories()
        .iter()
        .map(|c| format!("\"{}\"", capitalize(&c.name)))
        .collect();

    match names.as_slice() {
        [] => None,
        [only] => Some(only.clone()),
        [rest @ .., last] => Some(format!("{} o {last}", rest.join(", "))),
    }
}

pub fn category_question(catalog: &Catalog) -> String {
    category_options(catalog).map_or_else(
        || MENU_UNAVAILABLE.to_string(),
        |options| {
            format!("¿Sobre qué sección del menú deseas escuchar? Puedes decir {options}.")
        },
    )
}

pub fn category_not_understood(catalog: &Catalog) -> String {
    category_options(catalog).map_or_else(
        || MENU_UNAVAILABLE.to_string(),
        |options| {
            format!(
                "Lo siento, no entendí esa sección o no está disponible. \
                 Por favor, di una de las opciones: {options}."
            )
        },
    )
}

/// Every item in a category with its price
pub fn category_listing(category: &Category) -> String {
    let items: String = category
        .items
        .iter()
        .map(|item| format!(" {} a {}.", item.name, soles(item.unit_price)))
        .collect();
    format!("Aquí está nuestra sección de {}:{items}", category.name)
}

pub const ORDER_QUESTION: &str = "¿Deseas añadir algo de esta sección a tu pedido, o prefieres \
    escuchar otra sección? También puedes decir \"finalizar pedido\".";

pub fn added(item: &MenuItem, delta: u32, quantity: u32) -> String {
    if quantity > delta {
        format!("Agregado otro {}. Ahora tienes {quantity}.", item.name)
    } else if delta > 1 {
        format!("Agregados {delta} de {} a tu pedido.", item.name)
    } else {
        format!("Agregado {} a tu pedido.", item.name)
    }
}

pub fn removed(item_name: &str, outcome: RemoveOutcome) -> String {
    match outcome {
        RemoveOutcome::Removed => format!("Quitado {item_name} de tu pedido."),
        RemoveOutcome::Decremented { remaining } => {
            format!("Quitado un {item_name}. Te quedan {remaining}.")
        }
        RemoveOutcome::NotInCart => "Ese plato no está en tu pedido.".to_string(),
    }
}

pub fn cart_summary(cart: &Cart) -> String {
    let lines: Vec<String> = cart
        .lines()
        .iter()
        .map(|l| format!("{} de {}", l.quantity, l.item_name))
        .collect();
    format!(
        "Tu pedido actual es: {}. ¿Deseas modificarlo o \"finalizar pedido\"?",
        lines.join(", ")
    )
}

pub fn total(total: Price) -> String {
    format!("El total de tu pedido es {}.", soles(total))
}

pub fn confirm_question(total: Price) -> String {
    format!(
        "El total de tu pedido es {}. ¿Deseas confirmar este pedido? Di \"sí\" o \"no\".",
        soles(total)
    )
}

pub fn accepted(order_id: i64) -> String {
    format!(
        "Tu pedido ha sido recibido con éxito. Número de pedido: {order_id}. Gracias por tu compra."
    )
}

pub fn rejected(message: &str) -> String {
    format!("Lo siento, hubo un problema al enviar tu pedido: {message}")
}

pub fn something_else(catalog: &Catalog) -> String {
    format!("¿Deseas pedir algo más? {}", category_question(catalog))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::default_catalog;

    #[test]
    fn test_category_question_lists_options() {
        let question = category_question(&default_catalog());
        assert!(question.contains(
            "\"Brasa\", \"Broaster\", \"Parrillas\", \"Carnes y piqueos\" o \"Guarniciones\""
        ));
        assert_eq!(category_question(&Catalog::default()), MENU_UNAVAILABLE);
    }

    #[test]
    fn test_category_listing_reads_prices() {
        let catalog = default_catalog();
        let listing = category_listing(catalog.category("brasa").unwrap());
        assert!(listing.starts_with("Aquí está nuestra sección de brasa:"));
        assert!(listing.contains("1 POLLO A LA BRASA a 53 con 90 soles."));
    }

    #[test]
    fn test_added_wording() {
        let catalog = default_catalog();
        let papas = catalog.item("PAPAS FRITAS").unwrap();
        assert_eq!(added(papas, 1, 1), "Agregado PAPAS FRITAS a tu pedido.");
        assert_eq!(added(papas, 2, 2), "Agregados 2 de PAPAS FRITAS a tu pedido.");
        assert_eq!(added(papas, 1, 3), "Agregado otro PAPAS FRITAS. Ahora tienes 3.");
    }

    #[test]
    fn test_total_wording() {
        assert_eq!(
            total(Price::from_cents(7190)),
            "El total de tu pedido es 71 con 90 soles."
        );
    }
}

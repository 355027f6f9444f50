use table::{IntoTable, Table};
mod table;

use crate::persona::{Persona, Personas};
use crate::{die, ListingFormat, PersonasArgs};

#[derive(serde::Serialize)]
struct PersonaListing {
    id: String,
    name: String,
    description: String,
    greeting: String,
    tips: Vec<String>,
}

impl From<&Persona> for PersonaListing {
    fn from(value: &Persona) -> Self {
        PersonaListing {
            id: value.id.clone(),
            name: value.name.clone(),
            description: value.description.clone(),
            greeting: value.greeting.clone(),
            tips: value.tips.clone(),
        }
    }
}

// Free-text fields are left to the JSON listing so that table rows stay
// splittable on whitespace
impl From<Vec<PersonaListing>> for Table {
    fn from(value: Vec<PersonaListing>) -> Self {
        let mut tab = Table::new();

        tab.set_header(vec!["PERSONA", "NAME"]);

        for persona in value {
            tab.add_row(vec![persona.id, persona.name]);
        }

        tab
    }
}

fn format_output<O: IntoTable + serde::Serialize>(object: O, format: ListingFormat) -> String {
    match format {
        ListingFormat::Json => match serde_json::to_string_pretty(&object) {
            Ok(output) => format!("{}\n", output),
            Err(err) => die!("failed to serialize the listing: {}", err),
        },
        ListingFormat::Table => object.into_table().to_string(),
        ListingFormat::HeaderlessTable => {
            let mut tab = object.into_table();

            tab.print_header(false);

            tab.to_string()
        }
    }
}

fn listing(personas: &Personas) -> Vec<PersonaListing> {
    personas.iter().map(PersonaListing::from).collect()
}

pub(crate) fn personas_cmd(personas: &Personas, args: &PersonasArgs) {
    print!("{}", format_output(listing(personas), args.format));
}

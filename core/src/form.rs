//! Labelled input fields shared by the edit and create forms.

use crate::builder::ElementCreator;
use crate::dom::{Document, NodeId};
use crate::error::{DomError, FormError};
use crate::types::{Animal, NewAnimal};

/// Handles to the three inputs of one rendered form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormFields {
    pub name: NodeId,
    pub age: NodeId,
    pub mammal: NodeId,
}

fn input_ids(prefix: &str) -> [String; 3] {
    [
        format!("{prefix}-name"),
        format!("{prefix}-age"),
        format!("{prefix}-mammal"),
    ]
}

/// Appends the name, age and mammal inputs to `form`. Input ids are derived
/// from `prefix` so two open forms never share an id.
pub fn append_fields<L>(
    form: ElementCreator<L>,
    prefix: &str,
    initial: Option<&Animal>,
) -> ElementCreator<L> {
    let [name_id, age_id, mammal_id] = input_ids(prefix);

    let name = ElementCreator::new("input").id(&name_id).with("type", "text");
    let age = ElementCreator::new("input").id(&age_id).with("type", "number").with("min", 0);
    let mammal = ElementCreator::new("input").id(&mammal_id).with("type", "checkbox");
    let (name, age, mammal) = match initial {
        Some(animal) => (
            name.with("value", &animal.name),
            age.with("value", animal.age),
            mammal.with_if(animal.is_mammal, |input| input.with("checked", "checked")),
        ),
        None => (name, age, mammal),
    };

    form.append(ElementCreator::new("label").text("Name").with("for", &name_id))
        .append(name)
        .append(ElementCreator::new("label").text("Age").with("for", &age_id))
        .append(age)
        .append(ElementCreator::new("label").text("Is Mammal").with("for", &mammal_id))
        .append(mammal)
}

impl FormFields {
    /// Finds the inputs `append_fields` created below `form`.
    pub fn locate<L>(doc: &Document<L>, form: NodeId, prefix: &str) -> Result<Self, DomError> {
        let [name, age, mammal] = input_ids(prefix).map(|id| {
            doc.find_by_id_within(form, &id)
                .ok_or(DomError::MissingElement(id))
        });
        Ok(Self {
            name: name?,
            age: age?,
            mammal: mammal?,
        })
    }

    /// Reads and validates the current input values.
    pub fn read<L>(&self, doc: &Document<L>) -> Result<NewAnimal, FormError> {
        let name = doc.value(self.name).unwrap_or_default().trim();
        if name.is_empty() {
            return Err(FormError::EmptyName);
        }
        let raw_age = doc.value(self.age).unwrap_or_default();
        let age = raw_age
            .trim()
            .parse::<u32>()
            .map_err(|_| FormError::InvalidAge(raw_age.to_string()))?;
        Ok(NewAnimal {
            name: name.to_string(),
            age,
            is_mammal: doc.checked(self.mammal),
        })
    }
}

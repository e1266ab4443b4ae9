//! Interactive editing of the options form.

use inquire::{InquireError, Select, Text};
use read_aloud::Element;
use read_aloud::options::descriptor;

/// A choice in a select control.
struct Choice {
    value: String,
    label: String,
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// Prompts for every named control of `form` and returns an edited copy.
///
/// Returns `Ok(None)` when the user cancels with ESC or Ctrl-C.
pub fn edit_form(form: &Element) -> Result<Option<Element>, InquireError> {
    let mut edited = form.clone();

    let names: Vec<String> = form
        .form_controls()
        .into_iter()
        .filter(|control| control.tag() != "button")
        .filter_map(|control| control.attr("name").map(str::to_string))
        .collect();

    for name in names {
        let Some(control) = edited.control_mut(&name) else {
            continue;
        };
        let label = descriptor(&name).map_or(name.as_str(), |d| d.label);

        let answer = match control.tag() {
            "select" => prompt_select(label, control),
            _ => {
                let current = control.control_value().unwrap_or_default();
                Text::new(label).with_default(&current).prompt()
            }
        };

        match answer {
            Ok(value) => control.set_control_value(&value),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(None);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(Some(edited))
}

fn prompt_select(label: &str, control: &Element) -> Result<String, InquireError> {
    let current = control.control_value();
    let choices: Vec<Choice> = control
        .child_elements()
        .filter(|option| option.tag() == "option")
        .map(|option| Choice {
            value: option
                .attr("value")
                .map_or_else(|| option.text_content(), str::to_string),
            label: option.text_content(),
        })
        .collect();

    let cursor = choices
        .iter()
        .position(|choice| Some(&choice.value) == current.as_ref())
        .unwrap_or(0);

    Select::new(label, choices)
        .with_starting_cursor(cursor)
        .with_help_message("↑↓ to move, enter to select, ESC to cancel")
        .prompt()
        .map(|choice| choice.value)
}

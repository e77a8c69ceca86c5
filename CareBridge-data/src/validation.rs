use validator::ValidationErrors;

/// Flatten validator errors into a single readable message
///
/// Produces `field: message, message; other_field: message`, falling back to
/// `Invalid <field>` when a rule carries no message.
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    // field_errors() is a HashMap
    fields.sort();
    fields.join("; ")
}

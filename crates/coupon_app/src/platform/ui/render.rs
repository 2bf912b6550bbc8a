use coupon_core::{
    AppViewModel, EmailFeedback, FieldId, FieldView, ImportView, LineMarker, ManualListView,
    PickerState, RecipientTab,
};

/// Height of one list row in the scroll offsets the list reports.
const ROW_HEIGHT_PX: u32 = 20;
/// Rows of the recipient list visible at once.
const VISIBLE_ROWS: usize = 15;
/// Imported phones listed before the preview is cut short.
const IMPORT_PREVIEW_ROWS: usize = 20;

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    out.push_str("== Coupon dispatch ==\n");
    for field in &view.fields {
        out.push_str(&format_field(field, view.email_feedback));
        out.push('\n');
    }
    out.push_str(&format!("{:<18}{}\n", "Dispatch time", view.dispatch_time));
    let product = match &view.product {
        Some(product) => format!("{} [#{}]", product.name, product.id),
        None => "(none, use 'products')".to_string(),
    };
    out.push_str(&format!("{:<18}{}\n", "Product", product));
    out.push_str(&render_picker(view));

    let (manual_tab, import_tab) = match view.active_tab {
        RecipientTab::Manual => ("[Manual]", "Import"),
        RecipientTab::Import => ("Manual", "[Import]"),
    };
    out.push_str(&format!("-- Recipients: {manual_tab} {import_tab} --\n"));
    match view.active_tab {
        RecipientTab::Manual => out.push_str(&render_manual(&view.manual)),
        RecipientTab::Import => out.push_str(&render_import(&view.import)),
    }

    if view.submitting {
        out.push_str("Submitting...\n");
    } else if view.pending_confirmation.is_some() {
        out.push_str("Waiting for an answer (y/n).\n");
    }
    out
}

/// One-line summary printed after each change.
pub fn status_line(view: &AppViewModel) -> String {
    let recipients = match view.active_tab {
        RecipientTab::Manual => format!(
            "manual {} / {}",
            view.manual.filled, view.manual.limit
        ),
        RecipientTab::Import if view.import.loading => "import loading".to_string(),
        RecipientTab::Import => format!("import total {}", view.import.total),
    };
    let product = view
        .product
        .as_ref()
        .map(|product| product.name.as_str())
        .unwrap_or("-");
    let mut line = format!("[{recipients} | product {product}");
    if view.submitting {
        line.push_str(" | submitting");
    }
    line.push(']');
    line
}

fn format_field(field: &FieldView, email: EmailFeedback) -> String {
    let hint = match (field.field, email) {
        (FieldId::RequesterEmail, EmailFeedback::Valid) => "valid address".to_string(),
        (FieldId::RequesterEmail, EmailFeedback::Invalid) => "not an email address".to_string(),
        _ => field.counter.clone(),
    };
    format!("{:<18}{:<32}{}", field.label, field.value, hint)
}

fn render_picker(view: &AppViewModel) -> String {
    match &view.picker {
        PickerState::Closed => String::new(),
        PickerState::Loading => "  Loading products...\n".to_string(),
        PickerState::Failed(message) => format!("  Failed to load the product list: {message}\n"),
        PickerState::Open if view.picker_products.is_empty() => "  No products found.\n".to_string(),
        PickerState::Open => {
            let mut out = String::new();
            for product in &view.picker_products {
                let details = [
                    product.price.as_deref(),
                    product.expiry.as_deref(),
                    product.location.as_deref(),
                ]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(", ");
                out.push_str(&format!("  #{:<5}{}", product.id, product.name));
                if !details.is_empty() {
                    out.push_str(&format!(" ({details})"));
                }
                out.push('\n');
            }
            out
        }
    }
}

fn render_manual(manual: &ManualListView) -> String {
    let total = manual.line_numbers.len();
    let first = ((manual.gutter_scroll / ROW_HEIGHT_PX) as usize).min(total.saturating_sub(1));
    let mut out = String::new();
    for ((number, marker), digits) in manual
        .line_numbers
        .iter()
        .zip(&manual.markers)
        .zip(manual.text.split('\n'))
        .skip(first)
        .take(VISIBLE_ROWS)
    {
        out.push_str(&format!("{number:>4} {} {digits}\n", marker_glyph(*marker)));
    }
    if first + VISIBLE_ROWS < total {
        out.push_str(&format!("     ... {} more lines\n", total - first - VISIBLE_ROWS));
    }
    out.push_str(&format!("Entered {} / {}\n", manual.filled, manual.limit));
    out
}

fn render_import(import: &ImportView) -> String {
    let mut out = String::new();
    match (&import.file_name, import.loading) {
        (None, _) => out.push_str("No file selected.\n"),
        (Some(name), true) => out.push_str(&format!("File: {name} (reading...)\n")),
        (Some(name), false) => {
            out.push_str(&format!("File: {name}\n"));
            for phone in import.phones.iter().take(IMPORT_PREVIEW_ROWS) {
                out.push_str(&format!("  {phone}\n"));
            }
            if import.phones.len() > IMPORT_PREVIEW_ROWS {
                out.push_str(&format!(
                    "  ... and {} more\n",
                    import.phones.len() - IMPORT_PREVIEW_ROWS
                ));
            }
        }
    }
    out.push_str(&format!("Total {}\n", import.total));
    out
}

fn marker_glyph(marker: LineMarker) -> char {
    match marker {
        LineMarker::Blank => ' ',
        LineMarker::Valid => 'O',
        LineMarker::Invalid => 'X',
    }
}

//! Wizard Flow Tests
//!
//! End-to-end guarantees of the session, catalog and builder.

use chrono::{Days, Local, NaiveDate};
use std::collections::HashSet;
use std::io::Write;

use passportgen_core::{
    builder::FormField, Catalog, CatalogError, PreviewAction, RecordBuilder, RecordForm,
    SeededTokens, Session, SessionController, SessionError, Step, WizardSettings, ALL_REGIONS,
};

fn seeded_controller() -> SessionController {
    SessionController::new(RecordBuilder::with_tokens(
        WizardSettings::default(),
        Box::new(SeededTokens::new(7)),
    )
    .unwrap())
}

fn jane(form: &mut RecordForm) {
    for (key, value) in [
        ("firstName", "Jane"),
        ("lastName", "Doe"),
        ("dateOfBirth", "1990-01-01"),
        ("placeOfBirth", "Paris"),
        ("sex", "F"),
    ] {
        form.set(key, value).unwrap();
    }
}

fn is_generated_number(number: &str, code: &str) -> bool {
    match number.strip_prefix(code) {
        Some(token) => {
            token.len() == 7
                && token.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        }
        None => false,
    }
}

#[test]
fn filter_matches_name_and_region() {
    let catalog = Catalog::builtin();
    let searches = ["", "a", "UN", "south", "ia", "zzz"];

    for region in catalog.regions() {
        for search in searches {
            let hits = catalog.filter(search, region);
            for country in &hits {
                assert!(country.name.to_lowercase().contains(&search.to_lowercase()));
                assert!(region == ALL_REGIONS || country.region == region);
            }

            let expected = catalog
                .list()
                .iter()
                .filter(|c| c.name.to_lowercase().contains(&search.to_lowercase()))
                .filter(|c| region == ALL_REGIONS || c.region == region)
                .count();
            assert_eq!(hits.len(), expected, "search={:?} region={:?}", search, region);
        }
    }
}

#[test]
fn filter_is_idempotent() {
    let catalog = Catalog::builtin();
    let first: Vec<_> = catalog.filter("an", "Europe").into_iter().cloned().collect();
    let narrowed = Catalog::new(first.clone()).unwrap();
    let second: Vec<_> = narrowed.filter("an", "Europe").into_iter().cloned().collect();
    assert_eq!(first, second);
}

#[test]
fn regions_lead_with_all_and_never_repeat() {
    let catalog = Catalog::builtin();
    let regions = catalog.regions();
    assert_eq!(regions[0], ALL_REGIONS);
    let unique: HashSet<_> = regions.iter().collect();
    assert_eq!(unique.len(), regions.len());
}

#[test]
fn catalog_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"code": "IS", "name": "Iceland", "flagGlyph": "🇮🇸", "region": "Europe"}},
            {{"code": "NZ", "name": "New Zealand", "flagGlyph": "🇳🇿", "region": "Oceania"}}
        ]"#
    )
    .unwrap();

    let catalog = Catalog::load_from_file(file.path()).unwrap();
    assert_eq!(catalog.regions(), vec!["All", "Europe", "Oceania"]);
    assert_eq!(catalog.select("NZ").unwrap().name, "New Zealand");
}

#[test]
fn catalog_file_with_duplicate_codes_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"code": "IS", "name": "Iceland", "flagGlyph": "", "region": "Europe"}},
            {{"code": "IS", "name": "Island", "flagGlyph": "", "region": "Europe"}}
        ]"#
    )
    .unwrap();

    assert!(matches!(
        Catalog::load_from_file(file.path()),
        Err(CatalogError::DuplicateCode(_))
    ));
}

#[test]
fn login_then_select_then_submit() {
    let catalog = Catalog::builtin();
    let mut controller = seeded_controller();

    controller.login("a@b.com", "x").unwrap();
    assert_eq!(controller.step(), Step::CatalogSelection);
    assert_eq!(controller.session().user.as_ref().unwrap().display_name, "a");

    controller.select_country(catalog.select("FR").unwrap()).unwrap();
    assert_eq!(controller.step(), Step::RecordEntry);

    let mut form = controller.draft().unwrap();
    assert_eq!(form.get(FormField::Nationality), "France");
    jane(&mut form);

    let before = Local::now().date_naive();
    let record = controller.submit_record(&form).unwrap().clone();
    let after = Local::now().date_naive();

    assert_eq!(controller.step(), Step::RecordPreview);
    assert_eq!(record.full_name(), "Jane Doe");
    assert!(is_generated_number(&record.document.document_number, "FR"));

    let issued = record.document.issue_date;
    assert!(issued == before || issued == after);
    assert_eq!(
        record.document.expiry_date,
        issued.checked_add_days(Days::new(3650)).unwrap()
    );

    let presenter = controller.preview().unwrap();
    let details = presenter.details();
    let dob = details.iter().find(|l| l.label == "Date of Birth").unwrap();
    assert_eq!(dob.value, "01/01/1990");
    let expiry = details.iter().find(|l| l.label == "Expiry Date").unwrap();
    assert_eq!(expiry.value, record.document.expiry_date.format("%d/%m/%Y").to_string());
}

#[test]
fn blank_required_field_never_produces_record() {
    let catalog = Catalog::builtin();
    let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

    for field in FormField::REQUIRED {
        let mut controller = seeded_controller();
        controller.login("a@b.com", "x").unwrap();
        controller.select_country(catalog.select("DE").unwrap()).unwrap();

        let mut form = controller.draft().unwrap();
        jane(&mut form);
        form.set_field(field, "").unwrap();

        let result = controller.submit_record_on(&form, today);
        assert!(matches!(result, Err(SessionError::RecordRejected(_))), "{:?}", field);
        assert!(controller.session().record.is_none());
        assert_eq!(controller.step(), Step::RecordEntry);
    }
}

#[test]
fn same_seed_gives_same_document_number() {
    let catalog = Catalog::builtin();
    let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

    let numbers: Vec<_> = (0..2)
        .map(|_| {
            let mut controller = seeded_controller();
            controller.login("a@b.com", "x").unwrap();
            controller.select_country(catalog.select("JP").unwrap()).unwrap();
            let mut form = controller.draft().unwrap();
            jane(&mut form);
            controller
                .submit_record_on(&form, today)
                .unwrap()
                .document
                .document_number
                .clone()
        })
        .collect();

    assert_eq!(numbers[0], numbers[1]);
    assert!(is_generated_number(&numbers[0], "JP"));
}

#[test]
fn edit_and_resubmit_replaces_record() {
    let catalog = Catalog::builtin();
    let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let mut controller = seeded_controller();
    controller.login("a@b.com", "x").unwrap();
    controller.select_country(catalog.select("FR").unwrap()).unwrap();

    let mut form = controller.draft().unwrap();
    jane(&mut form);
    form.set("height", "170").unwrap();
    let first = controller.submit_record_on(&form, today).unwrap().clone();

    assert!(controller.on_preview(PreviewAction::Edit).unwrap().is_none());
    let mut draft = controller.draft().unwrap();
    draft.set("height", "").unwrap();
    draft.set("placeOfBirth", "Lyon").unwrap();

    let second = controller.submit_record_on(&draft, today).unwrap().clone();
    assert_ne!(first.id, second.id);
    assert_eq!(second.personal.height_cm, None);
    assert_eq!(second.personal.place_of_birth, "Lyon");
    assert_eq!(controller.session().record.as_ref(), Some(&second));
}

#[test]
fn logout_resets_from_every_step() {
    let catalog = Catalog::builtin();
    let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

    for stop_at in [Step::Login, Step::CatalogSelection, Step::RecordEntry, Step::RecordPreview] {
        let mut controller = seeded_controller();
        if stop_at != Step::Login {
            controller.signup("Jane", "jane@example.com", "pw").unwrap();
        }
        if matches!(stop_at, Step::RecordEntry | Step::RecordPreview) {
            controller.select_country(catalog.select("SE").unwrap()).unwrap();
        }
        if stop_at == Step::RecordPreview {
            let mut form = controller.draft().unwrap();
            jane(&mut form);
            controller.submit_record_on(&form, today).unwrap();
        }
        assert_eq!(controller.step(), stop_at);

        controller.logout();
        assert_eq!(controller.session(), &Session::new());
    }
}

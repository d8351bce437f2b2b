//! End-to-end generation tests over the fixtures in `tests/fixtures`

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use xsdvm::locations::Location;
use xsdvm::mapping::Strategy;
use xsdvm::pipeline::{Generator, Inputs};
use xsdvm::{Config, Error, Notice};

fn fixture(name: &str) -> Location {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    Location::Path(path)
}

fn unmapped(notices: &[Notice]) -> Vec<String> {
    let mut names: Vec<String> = notices
        .iter()
        .filter_map(|n| match n {
            Notice::UnmappedPlaceholder { placeholder } => Some(placeholder.clone()),
            _ => None,
        })
        .collect();
    names.sort();
    names
}

#[test]
fn test_person_maps_through_stored_values() {
    let inputs = Inputs::new(fixture("person.xsd")).with_sample(fixture("person_sample.json"));
    let generated = Generator::default().generate(&inputs).unwrap();

    assert_eq!(
        generated.template,
        "<FullyGeneratedVMTemplateFromXSD>\n\
         \x20 <Person>\n\
         \x20   <firstName>$request.firstName</firstName>\n\
         \x20   <lastName>$request.lastName</lastName>\n\
         \x20 </Person>\n\
         </FullyGeneratedVMTemplateFromXSD>\n"
    );
    assert_eq!(
        generated.text,
        "<FullyGeneratedVMTemplateFromXSD>\n\
         \x20 <Person>\n\
         \x20   <firstName>$currentValue.storedValues.firstName</firstName>\n\
         \x20   <lastName>$currentValue.storedValues.lastName</lastName>\n\
         \x20 </Person>\n\
         </FullyGeneratedVMTemplateFromXSD>\n"
    );
    assert_eq!(generated.mapping.count(Strategy::ExactStoredValue), 2);
    assert_eq!(generated.replacements, 2);
    assert!(generated.notices.is_empty());
}

#[test]
fn test_mutual_extension_terminates_with_one_marker() {
    let inputs = Inputs::new(fixture("cycle.xsd"));
    let generated = Generator::default().generate(&inputs).unwrap();

    assert_eq!(generated.text.matches("<!-- cycle:").count(), 1);
    let cycles = generated
        .notices
        .iter()
        .filter(|n| matches!(n, Notice::CycleDetected { .. }))
        .count();
    assert_eq!(cycles, 1);
}

#[test]
fn test_choice_selector_from_sample() {
    let inputs = Inputs::new(fixture("choice.xsd")).with_sample(fixture("xchoice_sample.json"));
    let generated = Generator::default().generate(&inputs).unwrap();

    let entry = generated.mapping.get("xChoice_choice").unwrap();
    assert_eq!(entry.strategy, Strategy::ChoiceSelector);
    assert_eq!(entry.expression, "$currentValue.xChoice['value']");

    assert!(generated.text.contains("#if($request.x_choice == 1)"));
    assert!(generated.text.contains("#if($request.x_choice == 2)"));
    assert_eq!(
        unmapped(&generated.notices),
        vec!["left", "right", "x_choice"]
    );
}

#[test]
fn test_applicant_uses_every_sample_strategy() {
    let inputs = Inputs::new(fixture("applicant.xsd"))
        .with_sample(fixture("applicant_sample.json"))
        .with_descriptor(fixture("applicant_form.json"));
    let generated = Generator::default().generate(&inputs).unwrap();
    let text = &generated.text;

    assert!(text.starts_with(
        "<tns:FullyGeneratedVMTemplateFromXSD xmlns:tns=\"urn:example:applicant\" xmlns=\"urn:example:applicant\">\n"
    ));
    assert!(text.contains("<tns:snils>$currentValue.c3['value']</tns:snils>"));
    assert!(text.contains("<tns:lastName>$currentValue.storedValues.lastName</tns:lastName>"));
    assert!(text.contains("<tns:FirstName>$currentValue.storedValues.first_name</tns:FirstName>"));
    assert!(text.contains("<tns:BirthDate>$currentValue.order.birth_date</tns:BirthDate>"));
    assert!(text.contains("<tns:email>$currentValue.storedValues.c9</tns:email>"));

    // Inherited fields come first
    let last = text.find("<tns:lastName>").unwrap();
    let snils = text.find("<tns:snils>").unwrap();
    assert!(last < snils);

    let mapping = &generated.mapping;
    assert_eq!(mapping.get("snils").unwrap().strategy, Strategy::ExactId);
    assert_eq!(mapping.get("lastName").unwrap().strategy, Strategy::ExactStoredValue);
    assert_eq!(mapping.get("FirstName").unwrap().strategy, Strategy::FuzzyName);
    assert_eq!(mapping.get("email").unwrap().strategy, Strategy::DescriptorBinding);
    assert_eq!(mapping.get("email").unwrap().source_key, "c9");

    assert_eq!(generated.report.total, 5);
    assert_eq!(generated.report.counts[&Strategy::FuzzyName], 2);
    assert_eq!(
        unmapped(&generated.notices),
        vec!["Document", "kind", "series"]
    );
}

#[test]
fn test_bad_samples_are_skipped() {
    let inputs = Inputs::new(fixture("person.xsd"))
        .with_sample(fixture("broken_sample.txt"))
        .with_sample(fixture("wrapped_sample.txt"))
        .with_sample(fixture("missing.json"));
    let generated = Generator::default().generate(&inputs).unwrap();

    let skipped: Vec<&Notice> = generated
        .notices
        .iter()
        .filter(|n| n.kind() == "sample-parse")
        .collect();
    assert_eq!(skipped.len(), 2);
    assert!(generated
        .text
        .contains("<firstName>$currentValue.storedValues.firstName</firstName>"));
}

#[test]
fn test_missing_descriptor_is_a_warning() {
    let inputs = Inputs::new(fixture("person.xsd"))
        .with_sample(fixture("person_sample.json"))
        .with_descriptor(fixture("missing_form.json"));
    let generated = Generator::default().generate(&inputs).unwrap();

    assert_eq!(generated.notices.len(), 1);
    assert!(generated.notices[0].is_warning());
    assert_eq!(generated.mapping.len(), 2);
}

#[test]
fn test_missing_schema_is_fatal() {
    let inputs = Inputs::new(fixture("missing.xsd"));
    let err = Generator::default().generate(&inputs).unwrap_err();
    assert!(matches!(err, Error::SchemaLoad(_)));
    assert!(err.to_string().contains("missing.xsd"));
}

#[test]
fn test_config_changes_output_syntax() {
    let config = Config::from_json_str(
        r#"{
            "template": {"placeholder_prefix": "$req.", "root_name": "Doc", "indent": "\t"},
            "sources": {"root": "$data"}
        }"#,
    )
    .unwrap();
    let inputs = Inputs::new(fixture("person.xsd")).with_sample(fixture("person_sample.json"));
    let generated = Generator::new(config).generate(&inputs).unwrap();

    assert!(generated.template.contains("\t\t<firstName>$req.firstName</firstName>\n"));
    assert!(generated
        .text
        .contains("<firstName>$data.storedValues.firstName</firstName>"));
    assert!(generated.text.starts_with("<Doc>\n"));
}

#[test]
fn test_mapping_exports_tokens() {
    let inputs = Inputs::new(fixture("person.xsd")).with_sample(fixture("person_sample.json"));
    let generated = Generator::default().generate(&inputs).unwrap();
    let json = serde_json::to_value(&generated.mapping).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "$request.firstName": "$currentValue.storedValues.firstName",
            "$request.lastName": "$currentValue.storedValues.lastName"
        })
    );
}

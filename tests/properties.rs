//! Property tests for list insertion.

use proptest::prelude::*;
use ts_splice::ast::SourceFile;
use ts_splice::ts::Dialect;
use ts_splice::ManipulationError;

fn array_source(elements: &[u32]) -> String {
    let joined: Vec<String> = elements.iter().map(u32::to_string).collect();
    format!("let xs = [{}];\n", joined.join(", "))
}

fn element_texts(file: &SourceFile) -> Vec<String> {
    let array = file.get_array("xs").unwrap();
    array
        .get_elements(file)
        .unwrap()
        .iter()
        .map(|element| file.text_of(element).unwrap().to_string())
        .collect()
}

proptest! {
    #[test]
    fn inserted_elements_land_at_the_index(
        existing in prop::collection::vec(0u32..1000, 0..6),
        new in prop::collection::vec(1000u32..2000, 1..4),
        index_seed in any::<prop::sample::Index>(),
    ) {
        let index = index_seed.index(existing.len() + 1);
        let mut file = SourceFile::from_text(array_source(&existing), Dialect::TypeScript).unwrap();
        let new_texts: Vec<String> = new.iter().map(u32::to_string).collect();

        let inserted = file
            .get_array("xs")
            .unwrap()
            .insert_elements(&mut file, index, &new_texts)
            .unwrap();

        let inserted_texts: Vec<String> = inserted
            .iter()
            .map(|handle| file.text_of(handle).unwrap().to_string())
            .collect();
        prop_assert_eq!(&inserted_texts, &new_texts);

        let mut expected: Vec<String> = existing.iter().map(u32::to_string).collect();
        for (offset, text) in new_texts.iter().enumerate() {
            expected.insert(index + offset, text.clone());
        }
        prop_assert_eq!(element_texts(&file), expected.clone());
        prop_assert_eq!(file.full_text(), array_source_from_texts(&expected));
        prop_assert_eq!(file.generation(), 1);
    }

    #[test]
    fn out_of_range_insert_changes_nothing(
        existing in prop::collection::vec(0u32..1000, 0..6),
        past_end in 1usize..10,
    ) {
        let source = array_source(&existing);
        let mut file = SourceFile::from_text(source.clone(), Dialect::TypeScript).unwrap();
        let index = existing.len() + past_end;

        let err = file
            .get_array("xs")
            .unwrap()
            .insert_elements(&mut file, index, &["1"])
            .unwrap_err();

        let is_out_of_range = matches!(err, ManipulationError::IndexOutOfRange { .. });
        prop_assert!(is_out_of_range);
        prop_assert_eq!(file.full_text(), source.as_str());
        prop_assert_eq!(file.generation(), 0);
    }
}

fn array_source_from_texts(texts: &[String]) -> String {
    format!("let xs = [{}];\n", texts.join(", "))
}

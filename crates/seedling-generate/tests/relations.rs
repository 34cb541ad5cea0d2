mod common;

use seedling_core::{FieldType, StoreError, Value};
use seedling_generate::generators::constant;
use seedling_generate::{FactoryOptions, GenerationError, GeneratorMapping, Overrides, Strategy};

use common::{seeder, seeder_with};

fn none() -> Overrides {
    Overrides::new()
}

#[test]
fn nested_override_reaches_the_related_instance() {
    let mut seeder = seeder();
    let dog = seeder
        .make_one("generic.dog", &Overrides::new().set("owner__name", "Rex's Owner"))
        .expect("make dog");

    assert!(dog.is_persisted());
    let owner = dog.related("owner").expect("owner built");
    assert!(owner.is_persisted());
    assert_eq!(owner.get("name"), Some(&Value::from("Rex's Owner")));
    assert!(owner.get("email").is_some_and(|email| !email.is_null()));
    assert_eq!(seeder.store().count("generic.person"), 1);
    assert_eq!(seeder.store().count("generic.dog"), 1);
}

#[test]
fn nested_overrides_span_several_hops() {
    let mut seeder = seeder();
    let overrides = Overrides::new()
        .set("color", "red")
        .set("dog__name", "Rex")
        .set("dog__owner__name", "Ana");
    let collar = seeder
        .make_one("generic.collar", &overrides)
        .expect("make collar");

    assert_eq!(collar.get("color"), Some(&Value::from("red")));
    let dog = collar.related("dog").expect("dog built");
    assert_eq!(dog.get("name"), Some(&Value::from("Rex")));
    let owner = dog.related("owner").expect("owner built");
    assert_eq!(owner.get("name"), Some(&Value::from("Ana")));
}

#[test]
fn nested_overrides_stay_on_their_own_relation() {
    let mut seeder = seeder();
    let walk = seeder
        .prepare_one("generic.walk", &Overrides::new().set("owner__name", "Z"))
        .expect("prepare walk");

    let owner = walk.related("owner").expect("owner built");
    assert_eq!(owner.get("name"), Some(&Value::from("Z")));
    let dog_owner = walk
        .related("dog")
        .and_then(|dog| dog.related("owner"))
        .expect("dog owner built");
    assert_ne!(dog_owner.get("name"), Some(&Value::from("Z")));
}

#[test]
fn relation_with_nested_overrides_receives_sibling_trees() {
    let mut seeder = seeder();
    let overrides = Overrides::new()
        .set("dog__name", "Rex")
        .set("owner__name", "Z");
    let walk = seeder
        .prepare_one("generic.walk", &overrides)
        .expect("prepare walk");

    assert_eq!(
        walk.related("owner").and_then(|owner| owner.get("name")),
        Some(&Value::from("Z"))
    );
    let dog = walk.related("dog").expect("dog built");
    assert_eq!(dog.get("name"), Some(&Value::from("Rex")));
    let dog_owner = dog.related("owner").expect("dog owner built");
    assert_eq!(dog_owner.get("name"), Some(&Value::from("Z")));
}

#[test]
fn own_nested_overrides_win_over_sibling_trees() {
    let mut seeder = seeder();
    let overrides = Overrides::new()
        .set("dog__owner__name", "Ana")
        .set("owner__name", "Z");
    let walk = seeder
        .prepare_one("generic.walk", &overrides)
        .expect("prepare walk");

    let dog_owner = walk
        .related("dog")
        .and_then(|dog| dog.related("owner"))
        .expect("dog owner built");
    assert_eq!(dog_owner.get("name"), Some(&Value::from("Ana")));
}

#[test]
fn related_instances_follow_the_outer_persisting_mode() {
    let mut seeder = seeder();
    let dog = seeder
        .prepare_one("generic.dog", &none())
        .expect("prepare dog");

    assert!(!dog.is_persisted());
    let owner = dog.related("owner").expect("owner built");
    assert!(!owner.is_persisted());
    assert!(seeder.store().is_empty());

    let collar = seeder
        .make_one("generic.collar", &none())
        .expect("make collar");
    let dog = collar.related("dog").expect("dog built");
    assert!(dog.is_persisted());
    assert!(dog.related("owner").is_some_and(|owner| owner.is_persisted()));
}

#[test]
fn direct_related_instance_is_used_as_given() {
    let mut seeder = seeder();
    let owner = seeder
        .make_one("generic.person", &Overrides::new().set("name", "Ana"))
        .expect("make owner");
    let dog = seeder
        .make_one("generic.dog", &Overrides::new().set("owner", owner.clone()))
        .expect("make dog");

    assert_eq!(dog.related("owner"), Some(&owner));
    assert_eq!(seeder.store().count("generic.person"), 1);
}

#[test]
fn unsaved_related_instance_cannot_be_persisted() {
    let mut seeder = seeder();
    let owner = seeder
        .prepare_one("generic.person", &none())
        .expect("prepare owner");
    let result = seeder.make_one("generic.dog", &Overrides::new().set("owner", owner));

    assert!(matches!(
        result,
        Err(GenerationError::Store(StoreError::UnsavedRelated { .. }))
    ));
    assert_eq!(seeder.store().count("generic.dog"), 0);
}

#[test]
fn nested_overrides_win_over_a_direct_relation_value() {
    let mut seeder = seeder();
    let existing = seeder
        .make_one("generic.person", &Overrides::new().set("name", "Old"))
        .expect("make person");
    let overrides = Overrides::new()
        .set("owner", existing.clone())
        .set("owner__name", "New");
    let dog = seeder
        .make_one("generic.dog", &overrides)
        .expect("make dog");

    let owner = dog.related("owner").expect("owner built");
    assert_eq!(owner.get("name"), Some(&Value::from("New")));
    assert_ne!(owner.pk, existing.pk);
}

#[test]
fn self_reference_chain_stops_after_two_levels() {
    let mut seeder = seeder();
    let node = seeder
        .make_one("generic.node", &none())
        .expect("make node");

    let parent = node.related("parent").expect("first level");
    let grandparent = parent.related("parent").expect("second level");
    assert!(grandparent.related("parent").is_none());
    assert_eq!(grandparent.get("parent"), Some(&Value::Null));
    assert_eq!(seeder.store().count("generic.node"), 3);
}

#[test]
fn explicit_nested_overrides_go_past_the_self_reference_bound() {
    let mut seeder = seeder();
    let node = seeder
        .make_one(
            "generic.node",
            &Overrides::new().set("parent__parent__parent__name", "root"),
        )
        .expect("make node");

    let deepest = node
        .related("parent")
        .and_then(|node| node.related("parent"))
        .and_then(|node| node.related("parent"))
        .expect("third level");
    assert_eq!(deepest.get("name"), Some(&Value::from("root")));
    assert!(deepest.related("parent").is_none());
}

#[test]
fn many_to_many_generates_five_members_and_links_them() {
    let mut seeder = seeder();
    let classroom = seeder
        .make_one("generic.classroom", &none())
        .expect("make classroom");

    let students = classroom.members("students");
    assert_eq!(students.len(), 5);
    assert!(students.iter().all(|student| student.is_persisted()));
    assert_eq!(seeder.store().links_for(&classroom, "students").len(), 5);
    assert_eq!(seeder.store().count("generic.person"), 5);
}

#[test]
fn many_to_many_quantity_follows_options() {
    let mut seeder = seeder_with(FactoryOptions {
        many_quantity: 2,
        seed: Some(3),
        ..FactoryOptions::default()
    });
    let classroom = seeder
        .make_one("generic.classroom", &none())
        .expect("make classroom");
    assert_eq!(classroom.members("students").len(), 2);
}

#[test]
fn disabled_many_to_many_leaves_relation_empty() {
    let mut seeder = seeder();
    let classroom = seeder
        .make_one_without_m2m("generic.classroom", &none())
        .expect("make classroom");

    assert!(classroom.is_persisted());
    assert!(classroom.members("students").is_empty());
    assert!(seeder.store().links().is_empty());
    assert_eq!(seeder.store().count("generic.person"), 0);
}

#[test]
fn prepared_many_to_many_members_stay_pending() {
    let mut seeder = seeder();
    let classroom = seeder
        .prepare_one("generic.classroom", &none())
        .expect("prepare classroom");

    let students = classroom.members("students");
    assert_eq!(students.len(), 5);
    assert!(students.iter().all(|student| !student.is_persisted()));
    assert!(seeder.store().is_empty());
}

#[test]
fn many_to_many_override_is_attached_after_save() {
    let mut seeder = seeder();
    let people = seeder
        .make_many("generic.person", Some(2), &none())
        .expect("make people");
    let classroom = seeder
        .make_one(
            "generic.classroom",
            &Overrides::new().set("students", people.clone()),
        )
        .expect("make classroom");

    assert_eq!(classroom.members("students"), people.as_slice());
    assert_eq!(seeder.store().links_for(&classroom, "students").len(), 2);
    assert_eq!(seeder.store().count("generic.person"), 2);
}

#[test]
fn nested_many_to_many_overrides_apply_to_every_member() {
    let mut seeder = seeder();
    let classroom = seeder
        .make_one("generic.classroom", &Overrides::new().set("students__name", "Pupil"))
        .expect("make classroom");

    let students = classroom.members("students");
    assert_eq!(students.len(), 5);
    for student in students {
        assert_eq!(student.get("name"), Some(&Value::from("Pupil")));
    }
}

#[test]
fn scalar_many_to_many_override_is_rejected() {
    let mut seeder = seeder();
    let result = seeder.make_one("generic.classroom", &Overrides::new().set("students", "all"));
    assert!(matches!(result, Err(GenerationError::InvalidOverride { .. })));
}

#[test]
fn nullable_and_generic_many_relations_are_skipped() {
    let mut seeder = seeder();
    let club = seeder
        .make_one("generic.club", &none())
        .expect("make club");
    assert!(club.members("members").is_empty());

    let post = seeder
        .make_one("generic.post", &none())
        .expect("make post");
    assert!(post.members("tags").is_empty());
    assert_eq!(seeder.store().count("generic.person"), 0);
    assert_eq!(seeder.store().count("generic.tag"), 0);
}

#[test]
fn many_to_many_follows_a_mapped_related_strategy() {
    let mapping = GeneratorMapping::new().with_type(FieldType::ManyToMany, Strategy::MakeRelated);
    let mut seeder = seeder().with_mapping(mapping);
    let classroom = seeder
        .make_one("generic.classroom", &none())
        .expect("make classroom");

    let students = classroom.members("students");
    assert_eq!(students.len(), 1);
    assert!(students[0].is_persisted());
    assert_eq!(seeder.store().links_for(&classroom, "students").len(), 1);
}

#[test]
fn many_to_many_follows_a_mapped_generator() {
    let mapping = GeneratorMapping::new()
        .with_type_generator(FieldType::ManyToMany, constant(Value::Instances(Vec::new())));
    let mut seeder = seeder().with_mapping(mapping);
    let classroom = seeder
        .make_one("generic.classroom", &none())
        .expect("make classroom");

    assert!(classroom.members("students").is_empty());
    assert_eq!(seeder.store().count("generic.person"), 0);

    let mapping = GeneratorMapping::new()
        .with_type_generator(FieldType::ManyToMany, constant("alice"));
    let mut seeder = common::seeder().with_mapping(mapping);
    let result = seeder.make_one("generic.classroom", &none());
    assert!(matches!(
        result,
        Err(GenerationError::InvalidOverride { .. })
    ));
}

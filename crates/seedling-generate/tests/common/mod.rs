#![allow(dead_code)]

use std::sync::Arc;

use seedling_core::{
    CONTENT_TYPE_MODEL, FieldDef, FieldType, InMemoryStore, ModelDef, ModelRegistry,
};
use seedling_generate::{FactoryOptions, ModelFinder, Seeder};

pub const SEED: u64 = 7;

fn id() -> FieldDef {
    FieldDef::new("id", FieldType::Auto)
}

pub fn person() -> ModelDef {
    ModelDef::new("generic", "Person")
        .field(id())
        .field(FieldDef::char("name", 30))
        .field(FieldDef::char("nickname", 20).blank_allowed())
        .field(FieldDef::char("gender", 1).with_choices(["M", "F"]))
        .field(FieldDef::new("age", FieldType::Integer).nullable())
        .field(FieldDef::new("bio", FieldType::Text))
        .field(FieldDef::new("blog", FieldType::Url).blank_allowed())
        .field(FieldDef::new("email", FieldType::Email))
        .field(FieldDef::new("wanted_games_qtd", FieldType::PositiveSmallInteger))
        .field(FieldDef::new("birthday", FieldType::Date))
        .field(FieldDef::new("appointment", FieldType::DateTime))
        .field(FieldDef::new("birth_time", FieldType::Time))
        .field(FieldDef::new("score", FieldType::Decimal).with_decimal(5, 2))
        .field(FieldDef::new("happy", FieldType::Boolean).with_default(true))
        .field(FieldDef::new("unhappy", FieldType::Boolean).blank_allowed())
}

pub fn registry() -> ModelRegistry {
    ModelRegistry::from_models([
        person(),
        ModelDef::new("generic", "Dog")
            .field(id())
            .field(FieldDef::foreign_key("owner", "generic.person"))
            .field(FieldDef::char("name", 20))
            .field(FieldDef::char("breed", 50)),
        ModelDef::new("generic", "Collar")
            .field(id())
            .field(FieldDef::one_to_one("dog", "generic.dog"))
            .field(FieldDef::char("color", 10)),
        ModelDef::new("generic", "Walk")
            .field(id())
            .field(FieldDef::foreign_key("dog", "generic.dog"))
            .field(FieldDef::foreign_key("owner", "generic.person")),
        ModelDef::new("generic", "Node")
            .field(id())
            .field(FieldDef::char("name", 10))
            .field(FieldDef::foreign_key("parent", "generic.node")),
        ModelDef::new("generic", "Classroom")
            .field(id())
            .field(FieldDef::char("name", 20))
            .field(FieldDef::many_to_many("students", "generic.person")),
        ModelDef::new("generic", "Club")
            .field(id())
            .field(FieldDef::many_to_many("members", "generic.person").nullable()),
        ModelDef::new("generic", "Grade")
            .field(id())
            .field(FieldDef::char("letter", 1).with_choices(["A", "B", "C"])),
        ModelDef::new("generic", "Server")
            .field(id())
            .field(FieldDef::new(
                "ip",
                FieldType::Other("ip_address".to_string()),
            )),
        ModelDef::new("generic", "Post")
            .field(id())
            .field(FieldDef::new("body", FieldType::Text).with_max_length(80))
            .field(FieldDef::new("tags", FieldType::GenericRelation).related_to("generic.tag")),
        ModelDef::new("generic", "Tag")
            .field(id())
            .field(FieldDef::new("slug", FieldType::Slug).with_max_length(12))
            .field(FieldDef::foreign_key("content_type", CONTENT_TYPE_MODEL))
            .field(FieldDef::new("object_id", FieldType::PositiveInteger)),
        ModelDef::new("generic", "Profile")
            .field(id())
            .field(FieldDef::char("bio", 40)),
        ModelDef::new("accounts", "Profile")
            .field(id())
            .field(FieldDef::char("handle", 15)),
    ])
    .expect("build test registry")
}

pub fn finder() -> Arc<ModelFinder> {
    Arc::new(ModelFinder::new(Arc::new(registry())))
}

pub fn seeder() -> Seeder {
    seeder_with(FactoryOptions {
        seed: Some(SEED),
        ..FactoryOptions::default()
    })
}

pub fn seeder_with(options: FactoryOptions) -> Seeder {
    Seeder::with_store(finder(), InMemoryStore::new(), options)
}

use shelter_core::db::open_db_in_memory;
use shelter_core::{
    CatalogEntry, Gender, PetColumn, PetFields, PetFilter, PetService, PetTarget, Projection,
    RepoError, SortOrder, SqlitePetRepository,
};

fn female(name: &str) -> PetFields {
    PetFields::new().name(name).gender(Gender::Female)
}

#[test]
fn insert_on_collection_returns_item_target() {
    let conn = open_db_in_memory().unwrap();
    let service = PetService::new(SqlitePetRepository::try_new(&conn).unwrap());

    let target = service
        .insert(PetTarget::Collection, &female("Luna"))
        .unwrap();
    assert_eq!(target, PetTarget::Item(1));
    assert_eq!(
        target.to_string(),
        "content://com.example.android.pets/pets/1"
    );
}

#[test]
fn insert_on_item_target_is_unsupported() {
    let conn = open_db_in_memory().unwrap();
    let service = PetService::new(SqlitePetRepository::try_new(&conn).unwrap());

    let err = service
        .insert(PetTarget::Item(3), &female("Luna"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::UnsupportedOperation {
            operation: "insert",
            ..
        }
    ));
    assert_eq!(service.pet_count().unwrap(), 0);
}

#[test]
fn unknown_paths_are_unsupported_targets() {
    let conn = open_db_in_memory().unwrap();
    let service = PetService::new(SqlitePetRepository::try_new(&conn).unwrap());

    let err = service.insert_at("owners", &female("Luna")).unwrap_err();
    assert!(matches!(err, RepoError::UnsupportedTarget(_)));
    let err = service.delete_at("pets/x", &PetFilter::all()).unwrap_err();
    assert!(matches!(err, RepoError::UnsupportedTarget(_)));
    assert!(service.mime_type_at("dogs/1").is_err());
}

#[test]
fn path_addressed_operations_dispatch_by_target() {
    let conn = open_db_in_memory().unwrap();
    let service = PetService::new(SqlitePetRepository::try_new(&conn).unwrap());

    service.insert_at("pets", &female("Luna")).unwrap();
    service.insert_at("pets", &female("Nala")).unwrap();

    assert_eq!(service.delete_at("pets/2", &PetFilter::all()).unwrap(), 1);
    assert_eq!(
        service.mime_type_at("pets").unwrap(),
        PetTarget::Collection.mime_type()
    );
    assert_eq!(
        service.mime_type_at("pets/1").unwrap(),
        PetTarget::Item(1).mime_type()
    );
}

#[test]
fn item_target_ignores_caller_filter() {
    let conn = open_db_in_memory().unwrap();
    let service = PetService::new(SqlitePetRepository::try_new(&conn).unwrap());
    service.insert_dummy_pet().unwrap();
    let luna = service.insert(PetTarget::Collection, &female("Luna")).unwrap();

    let males_only = PetFilter {
        gender: Some(Gender::Male),
        ..PetFilter::default()
    };
    let rows = service
        .query(luna, &males_only, &Projection::all(), &SortOrder::default())
        .unwrap()
        .rows()
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name.as_deref(), Some("Luna"));

    let changed = service
        .update(luna, &males_only, &PetFields::new().weight(9))
        .unwrap();
    assert_eq!(changed, 1);
    assert_eq!(service.delete(luna, &males_only).unwrap(), 1);
    assert_eq!(service.pet_count().unwrap(), 1);
}

#[test]
fn collection_target_applies_caller_filter() {
    let conn = open_db_in_memory().unwrap();
    let service = PetService::new(SqlitePetRepository::try_new(&conn).unwrap());
    service.insert_dummy_pet().unwrap();
    service.insert(PetTarget::Collection, &female("Luna")).unwrap();
    service.insert(PetTarget::Collection, &female("Nala")).unwrap();

    let females = PetFilter {
        gender: Some(Gender::Female),
        ..PetFilter::default()
    };
    let changed = service
        .update(PetTarget::Collection, &females, &PetFields::new().breed("Tabby"))
        .unwrap();
    assert_eq!(changed, 2);

    let rows = service
        .query(
            PetTarget::Collection,
            &females,
            &Projection::of(&[PetColumn::Breed]),
            &SortOrder::default(),
        )
        .unwrap()
        .rows()
        .unwrap();
    assert!(rows.iter().all(|row| row.breed.as_deref() == Some("Tabby")));
}

#[test]
fn dummy_pet_matches_catalog_sample() {
    let conn = open_db_in_memory().unwrap();
    let service = PetService::new(SqlitePetRepository::try_new(&conn).unwrap());

    let id = service.insert_dummy_pet().unwrap();
    let pet = service.get_pet(id).unwrap().unwrap();
    assert_eq!(pet.name, "Tommy");
    assert_eq!(pet.breed.as_deref(), Some("Tommy"));
    assert_eq!(pet.gender, Gender::Male);
    assert_eq!(pet.weight, 7);
}

#[test]
fn catalog_entries_list_id_name_breed_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let service = PetService::new(SqlitePetRepository::try_new(&conn).unwrap());
    service.insert_dummy_pet().unwrap();
    service.insert(PetTarget::Collection, &female("Luna")).unwrap();

    assert_eq!(
        service.catalog_entries().unwrap(),
        vec![
            CatalogEntry {
                id: 1,
                name: "Tommy".to_string(),
                breed: Some("Tommy".to_string()),
            },
            CatalogEntry {
                id: 2,
                name: "Luna".to_string(),
                breed: None,
            },
        ]
    );
}

#[test]
fn delete_all_pets_empties_the_catalog() {
    let conn = open_db_in_memory().unwrap();
    let service = PetService::new(SqlitePetRepository::try_new(&conn).unwrap());
    for _ in 0..3 {
        service.insert_dummy_pet().unwrap();
    }

    assert_eq!(service.delete_all_pets().unwrap(), 3);
    assert!(service.catalog_entries().unwrap().is_empty());
    assert_eq!(service.delete_all_pets().unwrap(), 0);
}

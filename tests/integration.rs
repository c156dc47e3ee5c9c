use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use logistics_registry::error::{AppError, ReferenceError};
use logistics_registry::models::user::PasswordHasher;
use logistics_registry::models::{
    Address, AddressCreate, Delivery, DeliveryCompany, DeliveryCompanyCreate, DeliveryCreate,
    Driver, DriverCreate, EntityKind, Item, ItemCreate, ItemUpdate, Order, OrderCreate,
    OrderStatus, PackageItem, PackageItemCreate, Payment, PaymentCreate, PaymentMethod,
    PaymentStatus, Promotion, User, UserCreate, UserPublic, UserUpdate, Vehicle, VehicleCreate, VehicleType,
};
use logistics_registry::store::{Seed, Store};
use logistics_registry::validation::Rule;

struct TagHasher;

impl PasswordHasher for TagHasher {
    fn hash(&self, plain: &str) -> String {
        format!("hashed:{plain}")
    }
}

fn setup() -> Store {
    Store::new(100)
}

fn user_create(email: &str) -> UserCreate {
    UserCreate {
        email: email.to_string(),
        is_active: true,
        is_superuser: false,
        full_name: Some("Test User".to_string()),
        password: "password123".to_string(),
    }
}

fn item_create(title: &str) -> ItemCreate {
    ItemCreate {
        title: title.to_string(),
        description: None,
    }
}

fn address(store: &Store, city: &str) -> Address {
    let address = Address::new(AddressCreate {
        street: "Am Sandtorkai 1".to_string(),
        city: city.to_string(),
        state: None,
        postal_code: "20457".to_string(),
        country: "Germany".to_string(),
        latitude: Some(53.54),
        longitude: Some(9.99),
    })
    .unwrap();
    store.insert(address).unwrap()
}

fn order(store: &Store) -> Order {
    let sender = address(store, "Hamburg");
    let recipient = address(store, "Berlin");
    let order = Order::new(OrderCreate {
        customer_name: "Ada".to_string(),
        customer_email: "ada@example.com".to_string(),
        sender_address_id: sender.id,
        recipient_address_id: recipient.id,
        status: OrderStatus::Pending,
        total_weight: Some(4.0),
        total_price: 25.0,
    })
    .unwrap();
    store.insert(order).unwrap()
}

fn package(store: &Store, order_id: Uuid) -> PackageItem {
    let package = PackageItem::new(PackageItemCreate {
        order_id,
        description: "Books".to_string(),
        weight: 2.0,
        dimensions: "30x20x10".to_string(),
        quantity: 2,
    })
    .unwrap();
    store.insert(package).unwrap()
}

fn vehicle(store: &Store) -> Vehicle {
    let vehicle = Vehicle::new(VehicleCreate {
        vehicle_type: VehicleType::Car,
        registration_number: "HH-XY-42".to_string(),
        capacity: 500.0,
        current_location: None,
        is_available: true,
    })
    .unwrap();
    store.insert(vehicle).unwrap()
}

fn restricted(err: AppError) -> (EntityKind, EntityKind, &'static str) {
    match err {
        AppError::Reference(ReferenceError::Restricted {
            target,
            table,
            field,
            ..
        }) => (target, table, field),
        other => panic!("expected restricted delete, got {other:?}"),
    }
}

#[test]
fn deleting_user_cascades_to_owned_items() {
    let store = setup();
    let owner = store.create_user(user_create("owner@example.com"), &TagHasher).unwrap();
    let other = store.create_user(user_create("other@example.com"), &TagHasher).unwrap();

    for title in ["a", "b", "c"] {
        store.create_item(owner.id, item_create(title)).unwrap();
    }
    let kept = store.create_item(other.id, item_create("kept")).unwrap();

    let cascaded = store.delete::<User>(owner.id).unwrap();

    assert_eq!(cascaded, 3);
    assert!(store.get::<User>(owner.id).is_none());
    assert!(store.items_of(owner.id).is_empty());
    assert_eq!(store.len_of(EntityKind::Item), 1);
    assert!(store.contains::<Item>(kept.id));
    assert!(store.user_by_email("owner@example.com").is_none());
}

#[test]
fn deleting_order_cascades_to_package_items() {
    let store = setup();
    let order = order(&store);
    package(&store, order.id);
    package(&store, order.id);
    assert_eq!(store.package_items_of(order.id).len(), 2);

    let cascaded = store.delete::<Order>(order.id).unwrap();

    assert_eq!(cascaded, 2);
    assert!(store.package_items_of(order.id).is_empty());
    assert_eq!(store.len_of(EntityKind::PackageItem), 0);
}

#[test]
fn deleting_address_used_by_order_is_rejected() {
    let store = setup();
    let order = order(&store);

    let err = store.delete::<Address>(order.sender_address_id).unwrap_err();
    let (target, table, field) = restricted(err);

    assert_eq!(target, EntityKind::Address);
    assert_eq!(table, EntityKind::Order);
    assert_eq!(field, "sender_address_id");
    assert!(store.contains::<Address>(order.sender_address_id));
    assert!(store.contains::<Order>(order.id));
}

#[test]
fn deleting_order_with_payment_keeps_everything() {
    let store = setup();
    let order = order(&store);
    package(&store, order.id);
    let payment = Payment::new(PaymentCreate {
        order_id: order.id,
        amount: 25.0,
        payment_method: PaymentMethod::CreditCard,
        payment_status: PaymentStatus::Successful,
    })
    .unwrap();
    store.insert(payment).unwrap();

    let (_, table, _) = restricted(store.delete::<Order>(order.id).unwrap_err());

    assert_eq!(table, EntityKind::Payment);
    assert_eq!(store.package_items_of(order.id).len(), 1);
}

#[test]
fn deleting_vehicle_assigned_to_driver_is_rejected() {
    let store = setup();
    let vehicle = vehicle(&store);
    let driver = Driver::new(DriverCreate {
        name: "Dan".to_string(),
        phone_number: "+49 170 1".to_string(),
        license_number: "B-1".to_string(),
        assigned_vehicle_id: Some(vehicle.id),
        availability: true,
        current_location: None,
    })
    .unwrap();
    let driver = store.insert(driver).unwrap();

    let (_, table, field) = restricted(store.delete::<Vehicle>(vehicle.id).unwrap_err());
    assert_eq!(table, EntityKind::Driver);
    assert_eq!(field, "assigned_vehicle_id");

    store
        .update::<Driver, _>(driver.id, |d| d.assigned_vehicle_id = None)
        .unwrap();
    assert_eq!(store.delete::<Vehicle>(vehicle.id).unwrap(), 0);
}

#[test]
fn item_for_unknown_owner_is_dangling() {
    let store = setup();
    let ghost = Uuid::new_v4();

    let err = store.create_item(ghost, item_create("orphan")).unwrap_err();

    match err {
        AppError::Reference(ReferenceError::Dangling {
            table,
            field,
            target,
            id,
        }) => {
            assert_eq!(table, EntityKind::Item);
            assert_eq!(field, "owner_id");
            assert_eq!(target, EntityKind::User);
            assert_eq!(id, ghost);
        }
        other => panic!("expected dangling reference, got {other:?}"),
    }
    assert_eq!(store.len_of(EntityKind::Item), 0);
}

#[test]
fn delivery_checks_every_reference() {
    let store = setup();
    let order = order(&store);
    let hq = address(&store, "Bremen");
    let company = store
        .insert(
            DeliveryCompany::new(DeliveryCompanyCreate {
                name: "Hanse Express".to_string(),
                email: "ops@hanse.test".to_string(),
                phone_number: "+49 421 0".to_string(),
                headquarters_address_id: hq.id,
            })
            .unwrap(),
        )
        .unwrap();

    let create = DeliveryCreate {
        order_id: order.id,
        driver_id: None,
        vehicle_id: Some(Uuid::new_v4()),
        company_id: company.id,
        pickup_address_id: order.sender_address_id,
        delivery_address_id: order.recipient_address_id,
        status: Default::default(),
    };
    let err = store.insert(Delivery::new(create.clone()).unwrap()).unwrap_err();
    assert!(matches!(
        err,
        AppError::Reference(ReferenceError::Dangling {
            field: "vehicle_id",
            ..
        })
    ));

    let vehicle = vehicle(&store);
    let delivery = store
        .insert(
            Delivery::new(DeliveryCreate {
                vehicle_id: Some(vehicle.id),
                ..create
            })
            .unwrap(),
        )
        .unwrap();

    let (_, table, _) = restricted(store.delete::<DeliveryCompany>(company.id).unwrap_err());
    assert_eq!(table, EntityKind::Delivery);

    store.delete::<Delivery>(delivery.id).unwrap();
    store.delete::<DeliveryCompany>(company.id).unwrap();
    store.delete::<Address>(hq.id).unwrap();
}

#[test]
fn duplicate_email_is_a_unique_violation() {
    let store = setup();
    store.create_user(user_create("dup@example.com"), &TagHasher).unwrap();
    let second = store.create_user(user_create("second@example.com"), &TagHasher).unwrap();

    let err = store
        .create_user(user_create("dup@example.com"), &TagHasher)
        .unwrap_err();
    match err {
        AppError::Validation(err) => assert_eq!(err.rule_for("email"), Some(&Rule::Unique)),
        other => panic!("expected validation error, got {other:?}"),
    }

    let update = UserUpdate {
        email: Some("dup@example.com".to_string()),
        ..UserUpdate::default()
    };
    assert!(matches!(
        store.update_user(second.id, update, &TagHasher),
        Err(AppError::Validation(_))
    ));
    assert_eq!(
        store.get::<User>(second.id).unwrap().email,
        "second@example.com"
    );
}

#[tokio::test]
async fn concurrent_signups_with_same_email_admit_one() {
    let store = Arc::new(setup());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .create_user(user_create("race@example.com"), &TagHasher)
                    .is_ok()
            })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(store.len_of(EntityKind::User), 1);
}

#[test]
fn user_update_changes_email_and_password() {
    let store = setup();
    let user = store.create_user(user_create("before@example.com"), &TagHasher).unwrap();

    let update = UserUpdate {
        email: Some("after@example.com".to_string()),
        password: Some("brand-new-pass".to_string()),
        ..UserUpdate::default()
    };
    let updated = store.update_user(user.id, update, &TagHasher).unwrap();

    assert_eq!(updated.hashed_password, "hashed:brand-new-pass");
    assert!(store.user_by_email("before@example.com").is_none());
    assert_eq!(store.user_by_email("after@example.com").unwrap().id, user.id);
}

#[test]
fn item_update_is_partial_and_validated() {
    let store = setup();
    let owner = store.create_user(user_create("items@example.com"), &TagHasher).unwrap();
    let item = store
        .create_item(
            owner.id,
            ItemCreate {
                title: "Parcel".to_string(),
                description: Some("fragile".to_string()),
            },
        )
        .unwrap();

    let unchanged = store.update_item(item.id, ItemUpdate::default()).unwrap();
    assert_eq!(unchanged, item);

    let err = store
        .update_item(
            item.id,
            ItemUpdate {
                title: Some(String::new()),
                description: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(store.get::<Item>(item.id).unwrap().title, "Parcel");
}

#[test]
fn item_description_can_be_cleared() {
    let store = setup();
    let owner = store.create_user(user_create("clear@example.com"), &TagHasher).unwrap();
    let item = store
        .create_item(
            owner.id,
            ItemCreate {
                title: "Parcel".to_string(),
                description: Some("fragile".to_string()),
            },
        )
        .unwrap();

    let cleared = store
        .update_item(
            item.id,
            ItemUpdate {
                title: None,
                description: Some(None),
            },
        )
        .unwrap();
    assert_eq!(cleared.title, "Parcel");
    assert!(cleared.description.is_none());
}

#[test]
fn non_finite_numbers_cannot_be_stored() {
    let store = setup();
    let now = Utc::now();
    let promo = Promotion {
        id: Uuid::new_v4(),
        code: "NAN".to_string(),
        discount_percentage: f64::NAN,
        expiry_date: now,
        applicable_countries: None,
        created_at: now,
        updated_at: now,
    };

    match store.insert(promo).unwrap_err() {
        AppError::Validation(err) => {
            assert_eq!(err.rule_for("discount_percentage"), Some(&Rule::Finite))
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(store.len_of(EntityKind::Promotion), 0);

    let address = address(&store, "Hamburg");
    let err = store
        .update::<Address, _>(address.id, |a| a.longitude = Some(f64::INFINITY))
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(store.get::<Address>(address.id).unwrap().longitude, Some(9.99));
}

#[test]
fn update_stamps_updated_at_and_rejects_invalid_mutations() {
    let store = setup();
    let order = order(&store);

    std::thread::sleep(Duration::from_millis(5));
    let confirmed = store
        .update::<Order, _>(order.id, |o| o.status = OrderStatus::Confirmed)
        .unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    assert!(confirmed.updated_at > order.updated_at);
    assert_eq!(confirmed.created_at, order.created_at);

    let err = store
        .update::<Order, _>(order.id, |o| o.customer_email = "broken".to_string())
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(
        store.get::<Order>(order.id).unwrap().customer_email,
        "ada@example.com"
    );

    let err = store
        .update::<Order, _>(order.id, |o| o.recipient_address_id = Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(err, AppError::Reference(_)));
}

#[test]
fn unknown_ids_are_not_found() {
    let store = setup();
    let id = Uuid::new_v4();

    assert!(matches!(store.delete::<Order>(id), Err(AppError::NotFound(_))));
    assert!(matches!(store.resolve::<Vehicle>(id), Err(AppError::NotFound(_))));
    assert!(matches!(
        store.update_item(id, ItemUpdate::default()),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn user_listing_counts_all_users() {
    let store = setup();
    for n in 0..5 {
        store
            .create_user(user_create(&format!("user{n}@example.com")), &TagHasher)
            .unwrap();
    }

    let page = store.list_users(1, 2);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.count, 5);

    let body = serde_json::to_value(&page).unwrap();
    for user in body["data"].as_array().unwrap() {
        assert!(user.get("hashed_password").is_none());
    }
}

#[test]
fn item_listing_filters_by_owner() {
    let store = setup();
    let alice = store.create_user(user_create("alice@example.com"), &TagHasher).unwrap();
    let bob = store.create_user(user_create("bob@example.com"), &TagHasher).unwrap();
    for title in ["a1", "a2", "a3"] {
        store.create_item(alice.id, item_create(title)).unwrap();
    }
    store.create_item(bob.id, item_create("b1")).unwrap();

    let all = store.list_items(None, 0, 10);
    assert_eq!(all.count, 4);

    let mine = store.list_items(Some(alice.id), 0, 2);
    assert_eq!(mine.count, 3);
    assert_eq!(mine.data.len(), 2);
    assert!(mine.data.iter().all(|item| item.owner_id == alice.id));
}

#[test]
fn public_user_view_has_no_secret() {
    let store = setup();
    let user = store.create_user(user_create("public@example.com"), &TagHasher).unwrap();

    let body: Value = serde_json::to_value(UserPublic::from(&user)).unwrap();
    let keys: Vec<&String> = body.as_object().unwrap().keys().collect();

    assert_eq!(keys.len(), 5);
    assert!(body.get("hashed_password").is_none());
}

#[test]
fn seed_imports_full_graph_in_dependency_order() {
    let store = setup();
    let user_id = Uuid::new_v4();
    let sender = Uuid::new_v4();
    let recipient = Uuid::new_v4();
    let order_id = Uuid::new_v4();
    let vehicle_id = Uuid::new_v4();
    let driver_id = Uuid::new_v4();
    let company_id = Uuid::new_v4();

    let seed = Seed::from_json(
        &json!({
            "feedback": [{
                "id": Uuid::new_v4(), "order_id": order_id, "rating": 5, "comment": "fast"
            }],
            "deliveries": [{
                "id": Uuid::new_v4(), "order_id": order_id, "driver_id": driver_id,
                "vehicle_id": vehicle_id, "company_id": company_id,
                "pickup_address_id": sender, "delivery_address_id": recipient,
                "status": "in_transit", "started_at": Utc::now(), "delivered_at": null
            }],
            "drivers": [{
                "id": driver_id, "name": "Dan", "phone_number": "+49 1",
                "license_number": "B-1", "assigned_vehicle_id": vehicle_id,
                "current_location": null
            }],
            "vehicles": [{
                "id": vehicle_id, "type": "bike", "registration_number": "B-42",
                "capacity": 20.0, "current_location": "depot"
            }],
            "package_items": [{
                "id": Uuid::new_v4(), "order_id": order_id, "description": "Shoes",
                "weight": 1.2, "dimensions": "30x20x12", "quantity": 1
            }],
            "orders": [{
                "id": order_id, "customer_name": "Ada", "customer_email": "ada@example.com",
                "sender_address_id": sender, "recipient_address_id": recipient,
                "status": "confirmed", "total_weight": 1.2, "total_price": 49.0
            }],
            "delivery_companies": [{
                "id": company_id, "name": "Hanse Express", "email": "ops@hanse.test",
                "phone_number": "+49 421", "headquarters_address_id": sender
            }],
            "addresses": [
                { "id": sender, "street": "A 1", "city": "Hamburg", "state": null,
                  "postal_code": "20457", "country": "Germany", "latitude": null, "longitude": null },
                { "id": recipient, "street": "B 2", "city": "Berlin", "state": null,
                  "postal_code": "10115", "country": "Germany", "latitude": 52.52, "longitude": 13.40 }
            ],
            "items": [{ "id": Uuid::new_v4(), "title": "Lamp", "description": null, "owner_id": user_id }],
            "users": [{
                "id": user_id, "email": "seed@example.com", "full_name": null,
                "hashed_password": "hashed:seed"
            }],
            "promotions": [{
                "id": Uuid::new_v4(), "code": "WELCOME", "discount_percentage": 10.0,
                "expiry_date": Utc::now(), "applicable_countries": "Germany,Austria"
            }]
        })
        .to_string(),
    )
    .unwrap();
    assert_eq!(seed.len(), 12);

    let inserted = store.import(seed).unwrap();

    assert_eq!(inserted, 12);
    assert_eq!(store.len_of(EntityKind::Address), 2);
    let user = store.get::<User>(user_id).unwrap();
    assert!(user.is_active);
    assert!(!user.is_superuser);
    assert!(store.get::<Vehicle>(vehicle_id).unwrap().is_available);
    assert_eq!(store.get::<Order>(order_id).unwrap().status, OrderStatus::Confirmed);
}

#[test]
fn seed_with_invalid_record_stops_import() {
    let store = setup();
    let seed = Seed::from_json(
        &json!({
            "promotions": [{
                "id": Uuid::new_v4(), "code": "TOO-MUCH", "discount_percentage": 101.0,
                "expiry_date": Utc::now(), "applicable_countries": null
            }]
        })
        .to_string(),
    )
    .unwrap();

    let err = store.import(seed).unwrap_err();
    match err {
        AppError::Validation(err) => assert!(err.rule_for("discount_percentage").is_some()),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(store.len_of(EntityKind::Promotion), 0);
}

#[test]
fn seed_with_unknown_order_status_names_the_field() {
    let err = Seed::from_json(
        &json!({
            "orders": [{
                "id": Uuid::new_v4(), "customer_name": "Ada", "customer_email": "ada@example.com",
                "sender_address_id": Uuid::new_v4(), "recipient_address_id": Uuid::new_v4(),
                "status": "lost", "total_weight": null, "total_price": 1.0
            }]
        })
        .to_string(),
    )
    .unwrap_err();

    match err {
        AppError::Validation(err) => assert!(matches!(
            err.rule_for("status"),
            Some(Rule::OneOf { allowed }) if allowed.contains(&"in_transit".to_string())
        )),
        other => panic!("expected validation error, got {other:?}"),
    }
}

use std::collections::BTreeMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    sea_query::Expr,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    database::{
        models::{
            add_on, customer, customer_add_on, customer_service, employee, package, schedule,
            service, service_assignment, timeslot, vehicle,
        },
        types::Status,
    },
    errors::AppError,
    repositories::{PageRequest, Paged, add_ons, like_pattern},
};

/// Natural key of a booking.
#[derive(Debug, Clone, Copy)]
pub struct BookingKey {
    pub customer_id: i32,
    pub service_id: i32,
    pub package_id: i32,
}

/// Optional rows a booking points at; `None` keeps the current link.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingLinks {
    pub vehicle_id: Option<i32>,
    pub schedule_id: Option<i32>,
    pub quote_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookedAddOn {
    pub id: i32,
    pub quantity: i32,
    pub add_on: add_on::Model,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingSchedule {
    #[serde(flatten)]
    pub schedule: schedule::Model,
    pub timeslot: Option<timeslot::Model>,
}

/// A booking with every relation expanded.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: customer_service::Model,
    pub customer: Option<customer::Model>,
    pub service: Option<service::Model>,
    pub package: Option<package::Model>,
    pub vehicle: Option<vehicle::Model>,
    pub schedule: Option<BookingSchedule>,
    pub customer_add_ons: Vec<BookedAddOn>,
    pub employee: Option<employee::Model>,
}

pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<customer_service::Model, AppError> {
    customer_service::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Customer Service not found!"))
}

/// Upsert keyed by `(customer, service, package)`; status is reset to active.
pub async fn upsert<C: ConnectionTrait>(
    db: &C,
    key: BookingKey,
    links: BookingLinks,
) -> Result<customer_service::Model, AppError> {
    let existing = customer_service::Entity::find()
        .filter(customer_service::Column::CustomerId.eq(key.customer_id))
        .filter(customer_service::Column::ServiceId.eq(key.service_id))
        .filter(customer_service::Column::PackageId.eq(key.package_id))
        .lock_exclusive()
        .one(db)
        .await?;

    let mut active = match existing {
        Some(model) => model.into_active_model(),
        None => customer_service::ActiveModel {
            customer_id: Set(key.customer_id),
            service_id: Set(key.service_id),
            package_id: Set(key.package_id),
            ..Default::default()
        },
    };
    active.status_id = Set(Status::Active.id());
    if let Some(vehicle_id) = links.vehicle_id {
        active.vehicle_id = Set(Some(vehicle_id));
    }
    if let Some(quote_id) = links.quote_id {
        active.quote_id = Set(Some(quote_id));
    }
    if let Some(schedule_id) = links.schedule_id {
        // a schedule belongs to one booking; move it off any other
        let mut others = customer_service::Entity::update_many()
            .col_expr(customer_service::Column::ScheduleId, Expr::value(Option::<i32>::None))
            .filter(customer_service::Column::ScheduleId.eq(schedule_id));
        if let sea_orm::ActiveValue::Unchanged(id) = &active.id {
            others = others.filter(customer_service::Column::Id.ne(*id));
        }
        others.exec(db).await?;
        active.schedule_id = Set(Some(schedule_id));
    }

    let saved = active.save(db).await?;
    let id = match saved.id {
        sea_orm::ActiveValue::Set(id) | sea_orm::ActiveValue::Unchanged(id) => id,
        sea_orm::ActiveValue::NotSet => return Err(AppError::Internal),
    };
    find_by_id(db, id).await
}

/// Replaces every add-on row of a booking with `quantities` (add-on id => quantity).
pub async fn replace_add_ons<C: ConnectionTrait>(
    db: &C,
    booking: &customer_service::Model,
    quantities: &BTreeMap<i32, i32>,
) -> Result<Vec<customer_add_on::Model>, AppError> {
    let ids: Vec<i32> = quantities.keys().copied().collect();
    let known = add_ons::find_many(db, &ids).await?;
    if let Some(missing) = ids.iter().find(|id| !known.iter().any(|a| a.id == **id)) {
        return Err(AppError::not_found(format!("AddOn {} not found!", missing)));
    }

    customer_add_on::Entity::delete_many()
        .filter(customer_add_on::Column::CustomerServiceId.eq(booking.id))
        .exec(db)
        .await?;

    let mut rows = Vec::with_capacity(quantities.len());
    for (add_on_id, quantity) in quantities {
        let row = customer_add_on::ActiveModel {
            quantity: Set(*quantity),
            status_id: Set(Status::Active.id()),
            customer_id: Set(booking.customer_id),
            customer_service_id: Set(booking.id),
            add_on_id: Set(*add_on_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}

pub async fn load_details<C: ConnectionTrait>(
    db: &C,
    booking: customer_service::Model,
) -> Result<BookingDetails, AppError> {
    let customer = customer::Entity::find_by_id(booking.customer_id).one(db).await?;
    let service = service::Entity::find_by_id(booking.service_id).one(db).await?;
    let package = package::Entity::find_by_id(booking.package_id).one(db).await?;

    let vehicle = match booking.vehicle_id {
        Some(id) => vehicle::Entity::find_by_id(id).one(db).await?,
        None => None,
    };

    let schedule = match booking.schedule_id {
        Some(id) => schedule::Entity::find_by_id(id)
            .find_also_related(timeslot::Entity)
            .one(db)
            .await?
            .map(|(schedule, timeslot)| BookingSchedule { schedule, timeslot }),
        None => None,
    };

    let customer_add_ons = customer_add_on::Entity::find()
        .filter(customer_add_on::Column::CustomerServiceId.eq(booking.id))
        .find_also_related(add_on::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(row, add_on)| {
            add_on.map(|add_on| BookedAddOn {
                id: row.id,
                quantity: row.quantity,
                add_on,
            })
        })
        .collect();

    let employee = service_assignment::Entity::find()
        .filter(service_assignment::Column::CustomerServiceId.eq(booking.id))
        .find_also_related(employee::Entity)
        .one(db)
        .await?
        .and_then(|(_, employee)| employee);

    Ok(BookingDetails {
        booking,
        customer,
        service,
        package,
        vehicle,
        schedule,
        customer_add_ons,
        employee,
    })
}

/// Newest first. A numeric `query_string` matches the booking id, anything else the customer.
pub async fn list<C: ConnectionTrait>(
    db: &C,
    query_string: Option<&str>,
    page: PageRequest,
) -> Result<Paged<customer_service::Model>, AppError> {
    let mut query = customer_service::Entity::find();

    if let Some(term) = query_string.map(str::trim).filter(|t| !t.is_empty()) {
        if let Ok(id) = term.parse::<i32>() {
            query = query.filter(customer_service::Column::Id.eq(id));
        } else if let Some(pattern) = like_pattern(Some(term)) {
            query = query
                .join(JoinType::InnerJoin, customer_service::Relation::Customer.def())
                .filter(
                    Condition::any()
                        .add(customer::Column::FirstName.like(pattern.clone()))
                        .add(customer::Column::LastName.like(pattern.clone()))
                        .add(customer::Column::Email.like(pattern.clone()))
                        .add(customer::Column::Phone.like(pattern)),
                );
        }
    }

    let paginator = query
        .order_by_desc(customer_service::Column::CreatedAt)
        .order_by_desc(customer_service::Column::Id)
        .paginate(db, page.page_size());
    let count = paginator.num_items().await?;
    let rows = paginator.fetch_page(page.page_index()).await?;
    Ok(Paged { rows, count })
}

pub async fn set_status<C: ConnectionTrait>(
    db: &C,
    id: i32,
    status_id: i32,
) -> Result<customer_service::Model, AppError> {
    if Status::from_id(status_id).is_none() {
        return Err(AppError::invalid(format!("Unknown status {}", status_id)));
    }
    let mut active = find_by_id(db, id).await?.into_active_model();
    active.status_id = Set(status_id);
    Ok(active.update(db).await?)
}

/// One assignment per booking; re-assigning replaces the employee.
pub async fn assign_employee<C: ConnectionTrait>(
    db: &C,
    id: i32,
    employee_id: i32,
) -> Result<service_assignment::Model, AppError> {
    let booking = find_by_id(db, id).await?;
    let existing = service_assignment::Entity::find()
        .filter(service_assignment::Column::CustomerServiceId.eq(booking.id))
        .one(db)
        .await?;

    let assignment = match existing {
        Some(model) => {
            let mut active = model.into_active_model();
            active.employee_id = Set(employee_id);
            active.update(db).await?
        }
        None => {
            service_assignment::ActiveModel {
                customer_service_id: Set(booking.id),
                employee_id: Set(employee_id),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };
    Ok(assignment)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), AppError> {
    let booking = find_by_id(db, id).await?;
    customer_add_on::Entity::delete_many()
        .filter(customer_add_on::Column::CustomerServiceId.eq(booking.id))
        .exec(db)
        .await?;
    service_assignment::Entity::delete_many()
        .filter(service_assignment::Column::CustomerServiceId.eq(booking.id))
        .exec(db)
        .await?;
    customer_service::Entity::delete_by_id(booking.id).exec(db).await?;
    Ok(())
}

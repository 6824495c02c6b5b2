//! Construcción de consultas de listado de reservas
//!
//! Normaliza filtros, orden y paginación, y aplica el alcance por rol
//! antes de cualquier filtro del llamante: un requester solo ve sus
//! reservas, un driver solo las asignadas a él, admin/master ven todo.

use uuid::Uuid;

use crate::dto::booking_dto::BookingListParams;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::BookingStatus;
use crate::models::user::UserRole;
use crate::utils::errors::{AppError, AppResult};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Alcance impuesto por el rol del llamante
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleScope {
    All,
    Requester(Uuid),
    AssignedDriver(Uuid),
}

/// Campos de orden permitidos (lista blanca, nunca SQL del cliente)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    ScheduledPickup,
    FinalFare,
    BookingStatus,
}

impl SortField {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "created_at" => Some(SortField::CreatedAt),
            "scheduled_pickup" => Some(SortField::ScheduledPickup),
            "final_fare" => Some(SortField::FinalFare),
            "booking_status" => Some(SortField::BookingStatus),
            _ => None,
        }
    }

    pub fn as_column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::ScheduledPickup => "scheduled_pickup",
            SortField::FinalFare => "final_fare",
            SortField::BookingStatus => "booking_status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Consulta de listado ya validada y con alcance aplicado
#[derive(Debug, Clone)]
pub struct BookingListQuery {
    pub scope: RoleScope,
    pub status: Option<BookingStatus>,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub search: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub page: i64,
    pub limit: i64,
}

impl BookingListQuery {
    /// Valida los parámetros crudos del query string y construye la
    /// consulta con el alcance del rol ya aplicado.
    pub fn from_params(params: &BookingListParams, caller: &AuthenticatedUser) -> AppResult<Self> {
        let status = match params.status.as_deref() {
            Some(raw) => Some(BookingStatus::parse(raw).ok_or_else(|| {
                AppError::BadRequest(format!("Unknown booking status '{}'", raw))
            })?),
            None => None,
        };

        let sort_by = match params.sort_by.as_deref() {
            Some(raw) => SortField::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Unsupported sort field '{}'", raw)))?,
            None => SortField::CreatedAt,
        };

        let sort_order = match params.sort_order.as_deref() {
            Some("asc") => SortOrder::Asc,
            Some("desc") | None => SortOrder::Desc,
            Some(other) => {
                return Err(AppError::BadRequest(format!(
                    "Sort order must be 'asc' or 'desc', got '{}'",
                    other
                )))
            }
        };

        let scope = match caller.role {
            UserRole::User => RoleScope::Requester(caller.user_id),
            UserRole::Driver => RoleScope::AssignedDriver(caller.user_id),
            UserRole::Admin | UserRole::Master => RoleScope::All,
        };

        let page = params.page.unwrap_or(1).max(1);
        let limit = params
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            scope,
            status,
            vehicle_id: params.vehicle_id,
            driver_id: params.driver_id,
            user_id: params.user_id,
            search,
            sort_by,
            sort_order,
            page,
            limit,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> BookingListParams {
        BookingListParams {
            search: None,
            status: None,
            sort_by: None,
            sort_order: None,
            page: None,
            limit: None,
            vehicle_id: None,
            driver_id: None,
            user_id: None,
        }
    }

    fn admin() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Admin,
        }
    }

    #[test]
    fn defaults_are_newest_first_page_one() {
        let q = BookingListQuery::from_params(&params(), &admin()).unwrap();
        assert_eq!(q.sort_by, SortField::CreatedAt);
        assert_eq!(q.sort_order, SortOrder::Desc);
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn limit_is_clamped_and_page_floored() {
        let mut p = params();
        p.limit = Some(5000);
        p.page = Some(-3);
        let q = BookingListQuery::from_params(&p, &admin()).unwrap();
        assert_eq!(q.limit, MAX_PAGE_SIZE);
        assert_eq!(q.page, 1);
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let mut p = params();
        p.sort_by = Some("evil; DROP TABLE bookings".to_string());
        let err = BookingListQuery::from_params(&p, &admin()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut p = params();
        p.status = Some("InFlight".to_string());
        let err = BookingListQuery::from_params(&p, &admin()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn requester_scope_follows_caller_identity() {
        let caller = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            role: UserRole::User,
        };
        let q = BookingListQuery::from_params(&params(), &caller).unwrap();
        assert_eq!(q.scope, RoleScope::Requester(caller.user_id));
    }

    #[test]
    fn blank_search_is_dropped() {
        let mut p = params();
        p.search = Some("   ".to_string());
        let q = BookingListQuery::from_params(&p, &admin()).unwrap();
        assert!(q.search.is_none());
    }
}

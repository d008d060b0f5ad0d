use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Admin list row: a reservation joined with its ticket and raffle.
#[derive(Debug, Serialize)]
pub struct ReservationRowDto {
    pub id: i32,
    pub ticket_id: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub status: String,
    pub created_at: String,
    pub ticket_number: String,
    pub payment_status: String,
    pub raffle_title: String,
}

impl From<crate::db::ReservationListRow> for ReservationRowDto {
    fn from(row: crate::db::ReservationListRow) -> Self {
        Self {
            id: row.reservation.id,
            ticket_id: row.reservation.ticket_id,
            customer_name: row.reservation.customer_name,
            customer_phone: row.reservation.customer_phone,
            customer_email: row.reservation.customer_email,
            status: row.reservation.status.as_str().to_string(),
            created_at: row.reservation.created_at,
            ticket_number: row.ticket_number,
            payment_status: row.payment_status.as_str().to_string(),
            raffle_title: row.raffle_title,
        }
    }
}

use actix_web::HttpResponse;

use crate::models::imports::TemplateFormat;
use crate::services::imports::build_template;

const HEADERS: [&str; 10] = [
    "name",
    "email",
    "phone",
    "date_of_birth",
    "guardian_name",
    "guardian_phone",
    "address",
    "status",
    "enrolled_on",
    "notes",
];

const EXAMPLE: [&str; 10] = [
    "Ana Lopez",
    "ana.lopez@example.com",
    "+62 812-3456-7890",
    "2012-05-01",
    "Maria Lopez",
    "+62 811-2222-3333",
    "Jl. Merdeka 10",
    "active",
    "2024-09-01",
    "notes column is ignored",
];

pub fn download_template(format: TemplateFormat) -> HttpResponse {
    build_template(format, &HEADERS, &EXAMPLE, "students")
}

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{
    ChangePasswordDto, LoginRequest, LoginResponse, RequestResetDto, ResetPasswordDto,
    VerifyResponse,
};
use crate::modules::operators::model::{
    CreateOperatorDto, FilterOperatorsRequest, FilterOperatorsResponse, MessageResponse, Operator,
    OperatorQuery, OperatorRole, OperatorStatus, SortSpec, UpdateOperatorDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::verify_token,
        crate::modules::auth::controller::change_password,
        crate::modules::auth::controller::get_current_operator,
        crate::modules::auth::controller::request_reset,
        crate::modules::auth::controller::validate_reset_token,
        crate::modules::auth::controller::reset_password,
        crate::modules::operators::controller::get_all_operators,
        crate::modules::operators::controller::get_operator,
        crate::modules::operators::controller::filter_operators,
        crate::modules::operators::controller::create_operator,
        crate::modules::operators::controller::update_operator,
        crate::modules::operators::controller::delete_operator,
    ),
    components(
        schemas(
            Operator,
            OperatorStatus,
            OperatorRole,
            CreateOperatorDto,
            UpdateOperatorDto,
            SortSpec,
            OperatorQuery,
            FilterOperatorsRequest,
            FilterOperatorsResponse,
            LoginRequest,
            LoginResponse,
            VerifyResponse,
            ChangePasswordDto,
            RequestResetDto,
            ResetPasswordDto,
            MessageResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, token verification, and password reset"),
        (name = "Operators", description = "Role-gated operator account management")
    ),
    info(
        title = "Edg Backend API",
        version = "0.1.0",
        description = "Administrative backend for operator accounts: JWT authentication, password-reset token lifecycle, and role-gated CRUD.",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

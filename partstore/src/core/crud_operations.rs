/// Generate the standard list/get/create/update/delete handlers for a
/// [`CRUDResource`](crate::core::CRUDResource) in the calling module.
///
/// `crud_handlers!(Resource, CreateModel, UpdateModel)` generates all five.
/// The `@collection` form leaves out `get_one_handler` for resources whose
/// single-item view differs from the list item.
///
/// Handlers extract `State<DatabaseConnection>`, so they mount on any router
/// whose state implements `FromRef` for it.
#[macro_export]
macro_rules! crud_handlers {
    ($resource:ty, $create_model:ty, $update_model:ty) => {
        $crate::crud_handlers!(@one $resource);
        $crate::crud_handlers!(@collection $resource, $create_model, $update_model);
    };

    (@one $resource:ty) => {
        #[utoipa::path(
            get,
            path = "/{id}",
            params(("id" = uuid::Uuid, Path, description = "Resource id")),
            responses(
                (status = axum::http::StatusCode::OK, description = "The requested resource", body = $resource),
                (status = axum::http::StatusCode::NOT_FOUND, description = "Resource not found"),
                (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
            ),
            operation_id = format!("get_one_{}", <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR),
            summary = format!("Get one {}", <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR),
            description = format!(
                "Retrieves one {} by its ID.\n\n{}",
                <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR,
                <$resource as $crate::core::CRUDResource>::RESOURCE_DESCRIPTION
            )
        )]
        pub async fn get_one_handler(
            axum::extract::State(db): axum::extract::State<sea_orm::DatabaseConnection>,
            axum::extract::Path(id): axum::extract::Path<uuid::Uuid>,
        ) -> Result<axum::Json<$resource>, $crate::errors::ApiError> {
            <$resource as $crate::core::CRUDResource>::get_one(&db, id)
                .await
                .map(axum::Json)
        }
    };

    (@collection $resource:ty, $create_model:ty, $update_model:ty) => {
        #[utoipa::path(
            get,
            path = "/",
            params($crate::filtering::FilterOptions),
            responses(
                (status = axum::http::StatusCode::OK, description = "List of resources", body = [$resource]),
                (status = axum::http::StatusCode::BAD_REQUEST, description = "Malformed filter"),
                (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
            ),
            operation_id = format!("get_all_{}", <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_PLURAL),
            summary = format!("Get all {}", <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_PLURAL),
            description = format!(
                "Retrieves {}.\n\n{}\n\nSortable columns: {}.\n\nFilterable columns: {}.",
                <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_PLURAL,
                <$resource as $crate::core::CRUDResource>::RESOURCE_DESCRIPTION,
                <$resource as $crate::core::CRUDResource>::sortable_columns()
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", "),
                <$resource as $crate::core::CRUDResource>::filterable_columns()
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        )]
        pub async fn get_all_handler(
            axum::extract::Query(params): axum::extract::Query<$crate::filtering::FilterOptions>,
            axum::extract::State(db): axum::extract::State<sea_orm::DatabaseConnection>,
        ) -> Result<(axum::http::HeaderMap, axum::Json<Vec<$resource>>), $crate::errors::ApiError> {
            let (offset, limit) = $crate::filtering::parse_pagination(&params);
            let condition = $crate::filtering::apply_filters::<$resource>(params.filter.as_deref())?;
            let (order_column, order_direction) = $crate::filtering::parse_sorting::<$resource>(&params);

            let items = <$resource as $crate::core::CRUDResource>::get_all(
                &db,
                &condition,
                order_column,
                order_direction,
                offset,
                limit,
            )
            .await?;
            let total_count = <$resource as $crate::core::CRUDResource>::total_count(&db, &condition).await?;
            let headers = $crate::filtering::calculate_content_range(
                offset,
                limit,
                total_count,
                <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_PLURAL,
            );
            Ok((headers, axum::Json(items)))
        }

        #[utoipa::path(
            post,
            path = "/",
            request_body = $create_model,
            responses(
                (status = axum::http::StatusCode::CREATED, description = "Resource created successfully", body = $resource),
                (status = axum::http::StatusCode::CONFLICT, description = "Duplicate record"),
                (status = axum::http::StatusCode::UNPROCESSABLE_ENTITY, description = "Validation failed")
            ),
            operation_id = format!("create_one_{}", <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR),
            summary = format!("Create one {}", <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR),
            description = format!(
                "Creates a new {}.\n\n{}",
                <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR,
                <$resource as $crate::core::CRUDResource>::RESOURCE_DESCRIPTION
            )
        )]
        pub async fn create_one_handler(
            axum::extract::State(db): axum::extract::State<sea_orm::DatabaseConnection>,
            axum::Json(create_model): axum::Json<$create_model>,
        ) -> Result<(axum::http::StatusCode, axum::Json<$resource>), $crate::errors::ApiError> {
            <$resource as $crate::core::CRUDResource>::create(&db, create_model)
                .await
                .map(|created| (axum::http::StatusCode::CREATED, axum::Json(created)))
        }

        #[utoipa::path(
            put,
            path = "/{id}",
            params(("id" = uuid::Uuid, Path, description = "Resource id")),
            request_body = $update_model,
            responses(
                (status = axum::http::StatusCode::OK, description = "Resource updated successfully", body = $resource),
                (status = axum::http::StatusCode::NOT_FOUND, description = "Resource not found"),
                (status = axum::http::StatusCode::CONFLICT, description = "Duplicate record"),
                (status = axum::http::StatusCode::UNPROCESSABLE_ENTITY, description = "Validation failed")
            ),
            operation_id = format!("update_one_{}", <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR),
            summary = format!("Update one {}", <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR),
            description = format!(
                "Updates one {} by its ID.\n\n{}",
                <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR,
                <$resource as $crate::core::CRUDResource>::RESOURCE_DESCRIPTION
            )
        )]
        pub async fn update_one_handler(
            axum::extract::State(db): axum::extract::State<sea_orm::DatabaseConnection>,
            axum::extract::Path(id): axum::extract::Path<uuid::Uuid>,
            axum::Json(update_model): axum::Json<$update_model>,
        ) -> Result<axum::Json<$resource>, $crate::errors::ApiError> {
            <$resource as $crate::core::CRUDResource>::update(&db, id, update_model)
                .await
                .map(axum::Json)
        }

        #[utoipa::path(
            delete,
            path = "/{id}",
            params(("id" = uuid::Uuid, Path, description = "Resource id")),
            responses(
                (status = axum::http::StatusCode::NO_CONTENT, description = "Resource deleted successfully"),
                (status = axum::http::StatusCode::NOT_FOUND, description = "Resource not found"),
                (status = axum::http::StatusCode::CONFLICT, description = "Resource is still referenced")
            ),
            operation_id = format!("delete_one_{}", <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR),
            summary = format!("Delete one {}", <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR),
            description = format!(
                "Deletes one {} by its ID.\n\n{}",
                <$resource as $crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR,
                <$resource as $crate::core::CRUDResource>::RESOURCE_DESCRIPTION
            )
        )]
        pub async fn delete_one_handler(
            axum::extract::State(db): axum::extract::State<sea_orm::DatabaseConnection>,
            axum::extract::Path(id): axum::extract::Path<uuid::Uuid>,
        ) -> Result<axum::http::StatusCode, $crate::errors::ApiError> {
            <$resource as $crate::core::CRUDResource>::delete(&db, id)
                .await
                .map(|_| axum::http::StatusCode::NO_CONTENT)
        }
    };
}

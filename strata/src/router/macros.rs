/// Generate a router async method that walks the connectors serving a tag in
/// routing order and returns the first successful answer of a single-tag
/// provider call.
///
/// Connectors without the capability are skipped. When every attempted
/// connector reports the tag as unknown the method fails with `InvalidTag`.
#[macro_export]
macro_rules! strata_router_method {
    (
        $(#[$meta:meta])*
        method: $name:ident( $tag_ident:ident ) -> $ret:ty,
        accessor: $accessor:ident,
        capability: $capability:expr,
        call: $call_name:ident
    ) => {
        $(#[$meta])*
        #[cfg_attr(
            feature = "tracing",
            tracing::instrument(
                target = "strata::router",
                skip(self),
                fields(tag = %$tag_ident),
            )
        )]
        ///
        /// # Errors
        /// Returns `InvalidTag` if every eligible connector reports the tag as
        /// unknown, `Unsupported` if none offers the capability, and an
        /// aggregate of the individual failures otherwise.
        pub async fn $name(
            &self,
            $tag_ident: &strata_core::TagId,
        ) -> Result<$ret, strata_core::StrataError> {
            let ordered = self.ordered($tag_ident);
            self.fetch_single(
                ordered,
                $capability,
                strata_core::StrataError::invalid_tag($tag_ident.as_str()),
                |c| {
                    c.$accessor()?;
                    let t = $tag_ident.clone();
                    Some(async move {
                        if let Some(p) = c.$accessor() {
                            p.$call_name(&t).await
                        } else {
                            Err(strata_core::StrataError::connector(
                                c.name(),
                                format!("missing {} capability during call", $capability),
                            ))
                        }
                    })
                },
            )
            .await
            .map(|(v, _)| v)
        }
    };
}

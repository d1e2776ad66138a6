use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// Time a navigation function when the `perf_stats` feature is enabled.
///
/// The function body runs unchanged; a drop guard created at entry logs the
/// elapsed time through Bevy's `info!` when the call exceeds the threshold.
/// Without `perf_stats` the guard is compiled out entirely.
///
/// If the function takes a `tick: Res<NavTick>` parameter, the guard also
/// reports every 100th tick regardless of duration, so a steady-state cost
/// shows up in the log even when it never crosses the threshold.
///
/// # Example
/// ```ignore
/// #[profile(2)] // threshold in milliseconds, defaults to 1
/// pub fn advance_navigators(tick: Res<NavTick>, /* ... */) {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        attr.to_string().trim().parse().unwrap_or(1)
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    let takes_tick = sig.inputs.iter().any(|arg| {
        let FnArg::Typed(pat_type) = arg else {
            return false;
        };
        let Pat::Ident(pat_ident) = &*pat_type.pat else {
            return false;
        };
        if pat_ident.ident != "tick" {
            return false;
        }
        let ty = &pat_type.ty;
        quote!(#ty).to_string().contains("NavTick")
    });

    let guard = if takes_tick {
        quote! {
            struct NavProfileGuard {
                name: &'static str,
                start: std::time::Instant,
                tick: u64,
            }
            impl Drop for NavProfileGuard {
                fn drop(&mut self) {
                    let elapsed = self.start.elapsed();
                    if elapsed.as_millis() > #threshold_ms || self.tick % 100 == 0 {
                        bevy::prelude::info!("[NAV PERF] {} @tick {}: {:?}", self.name, self.tick, elapsed);
                    }
                }
            }
            NavProfileGuard {
                name: #fn_name_str,
                start: std::time::Instant::now(),
                tick: tick.0,
            }
        }
    } else {
        quote! {
            struct NavProfileGuard {
                name: &'static str,
                start: std::time::Instant,
            }
            impl Drop for NavProfileGuard {
                fn drop(&mut self) {
                    let elapsed = self.start.elapsed();
                    if elapsed.as_millis() > #threshold_ms {
                        bevy::prelude::info!("[NAV PERF] {}: {:?}", self.name, elapsed);
                    }
                }
            }
            NavProfileGuard {
                name: #fn_name_str,
                start: std::time::Instant::now(),
            }
        }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _nav_profile_guard = {
                #guard
            };

            #block
        }
    };

    output.into()
}

//! Interactive shell over one live cart.
//!
//! Unlike the one-shot commands, the shell keeps the cart in memory so
//! removals can be undone while their grace window runs. Timer expiries are
//! announced as they happen.

use std::io::{self, Write};
use std::str::FromStr;

use redshop_cart::{
    CartConfig, CartEvent, CartEventKind, CartHandle, CartManager, Catalog, Checkout,
    CheckoutError, Clock, KeyValueStore, PromoBook,
};
use redshop_core::{Category, PaymentMethod, ProductId, PromoInput, PromoInputError};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::render;

const HELP: &str = "\
Commands:
  catalog [category]   List products (laptop, phone, tablet, accessory)
  show <id>            Product details
  cart                 Show the cart
  add <id> [qty]       Add a product
  inc <id> / dec <id>  Change quantity by one
  set <id> <qty>       Set quantity (0 removes)
  rm <id>              Remove after the grace window
  undo <id>            Keep an item that is being removed
  promo <code>         Apply a promo code
  unpromo              Remove the promo code
  promos               List promo codes
  pay <method>         Check out (card, sbp, cash)
  quit                 Leave the shell";

/// Errors from parsing a shell line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid {name}: {value}")]
    InvalidArgument { name: &'static str, value: String },

    #[error(transparent)]
    Promo(#[from] PromoInputError),
}

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Catalog(Option<Category>),
    Show(ProductId),
    Cart,
    Add { id: ProductId, quantity: u32 },
    Increment(ProductId),
    Decrement(ProductId),
    Set { id: ProductId, quantity: u32 },
    Remove(ProductId),
    Undo(ProductId),
    Promo(PromoInput),
    Unpromo,
    Promos,
    Pay(PaymentMethod),
    Quit,
}

impl ShellCommand {
    /// Parse one input line. Blank lines yield `None`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown commands and missing or invalid arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace();

        let command = match name {
            "" => return Ok(None),
            "help" | "?" => Self::Help,
            "catalog" | "ls" => Self::Catalog(optional(args.next(), "category")?),
            "show" => Self::Show(required(args.next(), "product id")?),
            "cart" => Self::Cart,
            "add" => Self::Add {
                id: required(args.next(), "product id")?,
                quantity: optional(args.next(), "quantity")?.unwrap_or(1),
            },
            "inc" => Self::Increment(required(args.next(), "product id")?),
            "dec" => Self::Decrement(required(args.next(), "product id")?),
            "set" => Self::Set {
                id: required(args.next(), "product id")?,
                quantity: required(args.next(), "quantity")?,
            },
            "rm" | "remove" => Self::Remove(required(args.next(), "product id")?),
            "undo" => Self::Undo(required(args.next(), "product id")?),
            "promo" => Self::Promo(PromoInput::parse(rest)?),
            "unpromo" => Self::Unpromo,
            "promos" => Self::Promos,
            "pay" | "checkout" => Self::Pay(required(args.next(), "payment method")?),
            "quit" | "exit" => Self::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn optional<T: FromStr>(arg: Option<&str>, name: &'static str) -> Result<Option<T>, ParseError> {
    arg.map(|value| {
        value.parse().map_err(|_| ParseError::InvalidArgument {
            name,
            value: value.to_string(),
        })
    })
    .transpose()
}

fn required<T: FromStr>(arg: Option<&str>, name: &'static str) -> Result<T, ParseError> {
    optional(arg, name)?.ok_or(ParseError::MissingArgument(name))
}

/// Run the shell until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or terminal I/O fails.
pub async fn run(config: &CartConfig) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = config.catalog()?;
    let handle = CartHandle::new(config.open_cart());
    let mut events = handle.lock().await.subscribe();
    let timers = handle.spawn_timers();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!(products = catalog.len(), "Shell started");
    writeln!(io::stdout().lock(), "RedShop shell. Type `help` for commands.")?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let mut out = Vec::new();
                match ShellCommand::parse(&line) {
                    Ok(Some(ShellCommand::Quit)) => break,
                    Ok(Some(command)) => {
                        if let Err(e) = execute(&handle, &catalog, command, &mut out).await {
                            writeln!(out, "{e}")?;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => writeln!(out, "{e}")?,
                }
                io::stdout().lock().write_all(&out)?;
            }
            event = events.recv() => match event {
                Ok(event) => announce(&mut io::stdout().lock(), &event)?,
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Missed cart events"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    timers.abort();
    Ok(())
}

/// Report changes the shopper did not trigger directly.
fn announce(out: &mut impl Write, event: &CartEvent) -> io::Result<()> {
    match event.kind {
        CartEventKind::ItemRemoved { product_id } => writeln!(
            out,
            "Product {product_id} removed from the cart ({} items left)",
            event.item_count
        ),
        _ => Ok(()),
    }
}

/// Apply one command to the shared cart, writing its output to `out`.
///
/// # Errors
///
/// Returns an error describing why the command was rejected. The cart is
/// unchanged in that case.
pub async fn execute<S, C>(
    handle: &CartHandle<S, C>,
    catalog: &Catalog,
    command: ShellCommand,
    out: &mut Vec<u8>,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: KeyValueStore + Send + 'static,
    C: Clock + Send + 'static,
{
    match command {
        ShellCommand::Help | ShellCommand::Quit => writeln!(out, "{HELP}")?,
        ShellCommand::Catalog(category) => {
            for product in catalog.by_category(category) {
                render::product_row(out, product)?;
            }
        }
        ShellCommand::Show(id) => {
            let product = catalog
                .get(id)
                .ok_or_else(|| format!("Product {id} not found"))?;
            render::product_detail(out, product)?;
        }
        ShellCommand::Cart => render::cart(out, &*handle.lock().await)?,
        ShellCommand::Add { id, quantity } => {
            if !handle.update(|c| c.add_product(catalog, id, quantity)).await {
                return Err(format!("Product {id} not found").into());
            }
            render::cart(out, &*handle.lock().await)?;
        }
        ShellCommand::Increment(id) => {
            change(handle, id, |c| c.increment(id)).await?;
            render::cart(out, &*handle.lock().await)?;
        }
        ShellCommand::Decrement(id) => {
            change(handle, id, |c| c.decrement(id)).await?;
            render::cart(out, &*handle.lock().await)?;
        }
        ShellCommand::Set { id, quantity } => {
            change(handle, id, |c| c.set_quantity(id, quantity)).await?;
            render::cart(out, &*handle.lock().await)?;
        }
        ShellCommand::Remove(id) => {
            change(handle, id, |c| c.request_removal(id)).await?;
            let grace = handle.lock().await.grace_window();
            writeln!(
                out,
                "Removing product {id} in {:.1}s. Type `undo {id}` to keep it.",
                grace.as_secs_f64()
            )?;
        }
        ShellCommand::Undo(id) => {
            if !handle.update(|c| c.undo_removal(id)).await {
                return Err(format!("Product {id} is not being removed").into());
            }
            writeln!(out, "Kept product {id}")?;
        }
        ShellCommand::Promo(input) => {
            let percent = handle.update(|c| c.apply_promo(input.as_str())).await?;
            writeln!(out, "Promo code applied: {percent}% off")?;
            render::cart(out, &*handle.lock().await)?;
        }
        ShellCommand::Unpromo => {
            let code = handle.update(|c| c.remove_promo()).await?;
            writeln!(out, "Promo code {code} removed")?;
        }
        ShellCommand::Promos => render::promos(out, PromoBook::default().codes())?,
        ShellCommand::Pay(method) => {
            let order = handle
                .update(|c| -> Result<_, CheckoutError> {
                    let mut checkout = Checkout::begin(c)?;
                    checkout.select_payment_method(method);
                    checkout.confirm(&mut rand::rng())?;
                    checkout.complete(c)
                })
                .await?;
            render::receipt(out, &order)?;
        }
    }
    Ok(())
}

/// Run a cart change that reports `false` when the item is not in the cart.
async fn change<S, C>(
    handle: &CartHandle<S, C>,
    id: ProductId,
    f: impl FnOnce(&mut CartManager<S, C>) -> bool,
) -> Result<(), String>
where
    S: KeyValueStore + Send + 'static,
    C: Clock + Send + 'static,
{
    if handle.update(f).await {
        Ok(())
    } else {
        Err(format!("Product {id} is not in the cart"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use redshop_cart::{ManualClock, MemoryStore};

    use super::*;

    fn parse(line: &str) -> ShellCommand {
        ShellCommand::parse(line).unwrap().unwrap()
    }

    fn handle() -> (CartHandle<MemoryStore, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let cart = CartManager::new(MemoryStore::new(), clock.clone());
        (CartHandle::new(cart), clock)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ShellCommand::parse("   ").unwrap(), None);
        assert_eq!(parse("cart"), ShellCommand::Cart);
        assert_eq!(
            parse("catalog phone"),
            ShellCommand::Catalog(Some(Category::Phone))
        );
        assert_eq!(parse("ls"), ShellCommand::Catalog(None));
        assert_eq!(
            parse("add 3"),
            ShellCommand::Add {
                id: ProductId::new(3),
                quantity: 1
            }
        );
        assert_eq!(
            parse("  set 2 5 "),
            ShellCommand::Set {
                id: ProductId::new(2),
                quantity: 5
            }
        );
        assert_eq!(parse("pay sbp"), ShellCommand::Pay(PaymentMethod::Sbp));
        assert_eq!(parse("exit"), ShellCommand::Quit);
    }

    #[test]
    fn test_parse_promo_trims_code() {
        assert_eq!(
            parse("promo   TECH20  "),
            ShellCommand::Promo(PromoInput::parse("TECH20").unwrap())
        );
        assert_eq!(
            ShellCommand::parse("promo").unwrap_err(),
            ParseError::Promo(PromoInputError::Empty)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ShellCommand::parse("fly 1").unwrap_err(),
            ParseError::Unknown("fly".to_string())
        );
        assert_eq!(
            ShellCommand::parse("show").unwrap_err(),
            ParseError::MissingArgument("product id")
        );
        assert_eq!(
            ShellCommand::parse("set 1 lots").unwrap_err(),
            ParseError::InvalidArgument {
                name: "quantity",
                value: "lots".to_string()
            }
        );
        assert!(matches!(
            ShellCommand::parse("catalog toaster").unwrap_err(),
            ParseError::InvalidArgument {
                name: "category",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_remove_then_undo() {
        let (cart, clock) = handle();
        let catalog = Catalog::demo();
        let id = ProductId::new(5);
        let mut out = Vec::new();

        execute(&cart, &catalog, parse("add 5 2"), &mut out).await.unwrap();
        execute(&cart, &catalog, parse("rm 5"), &mut out).await.unwrap();
        assert!(cart.lock().await.is_pending_removal(id));

        clock.advance(std::time::Duration::from_secs(1));
        execute(&cart, &catalog, parse("undo 5"), &mut out).await.unwrap();

        clock.advance(std::time::Duration::from_secs(10));
        let mut guard = cart.lock().await;
        assert!(guard.fire_due_timers().is_empty());
        assert_eq!(guard.get(id).unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_rejected_commands_report_errors() {
        let (cart, _clock) = handle();
        let catalog = Catalog::demo();
        let mut out = Vec::new();

        let err = execute(&cart, &catalog, parse("inc 1"), &mut out)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Product 1 is not in the cart");

        let err = execute(&cart, &catalog, parse("pay card"), &mut out)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), CheckoutError::EmptyCart.to_string());

        let err = execute(&cart, &catalog, parse("undo 1"), &mut out)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Product 1 is not being removed");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_pay_empties_cart() {
        let (cart, _clock) = handle();
        let catalog = Catalog::demo();
        let mut out = Vec::new();

        execute(&cart, &catalog, parse("add 1"), &mut out).await.unwrap();
        execute(&cart, &catalog, parse("promo NEWYEAR2025"), &mut out)
            .await
            .unwrap();
        out.clear();
        execute(&cart, &catalog, parse("pay cash"), &mut out).await.unwrap();

        let receipt = String::from_utf8(out).unwrap();
        assert!(receipt.starts_with("Order #"));
        assert!(receipt.contains("(NEWYEAR2025)"));

        let guard = cart.lock().await;
        assert!(guard.is_empty());
        assert!(guard.applied_promo().is_none());
    }
}

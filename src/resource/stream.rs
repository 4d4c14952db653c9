//! Lazy stream over paginated list items.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;

use super::{ListResource, Resource};
use crate::Result;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// A stream that yields every item of a list, lazily following `next`
/// links when the current page is exhausted.
///
/// The stream fuses after the last page or after the first error.
///
/// # Example
///
/// ```no_run
/// use futures_util::StreamExt;
///
/// # async fn example(list: hal_client::ListResource) -> hal_client::Result<()> {
/// let mut stream = list.stream();
/// while let Some(item) = stream.next().await {
///     let item = item?;
///     println!("{:?}", item.property("name"));
/// }
/// # Ok(())
/// # }
/// ```
pub struct ItemStream {
    /// Items of the current page still to be yielded.
    current_items: Vec<Resource>,
    /// Page whose `next` link is still to be followed.
    source: Option<ListResource>,
    /// In-flight page fetch.
    pending: Option<BoxFuture<Result<ListResource>>>,
}

impl ItemStream {
    pub(crate) fn new(page: ListResource) -> Self {
        let current_items = page.items();
        let source = page.has_next_link().then_some(page);
        Self {
            current_items,
            source,
            pending: None,
        }
    }
}

impl Stream for ItemStream {
    type Item = Result<Resource>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            if !this.current_items.is_empty() {
                return Poll::Ready(Some(Ok(this.current_items.remove(0))));
            }

            if let Some(fut) = this.pending.as_mut() {
                match fut.as_mut().poll(cx) {
                    Poll::Ready(Ok(page)) => {
                        this.pending = None;
                        this.current_items = page.items();
                        this.source = page.has_next_link().then_some(page);
                        continue;
                    }
                    Poll::Ready(Err(e)) => {
                        this.pending = None;
                        this.source = None;
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            if let Some(page) = this.source.take() {
                this.pending = Some(Box::pin(async move { page.follow_next_link().await }));
                continue;
            }

            return Poll::Ready(None);
        }
    }
}

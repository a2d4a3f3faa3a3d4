use super::domain::Book;

/// Share of lendable copies, in percent, that must stay on the shelf.
pub const MIN_AVAILABLE_PERCENT: usize = 10;

/// Decides whether a book may leave the building right now.
///
/// Reading-room copies count toward neither side. At least
/// `ceil(lendable * 10%)` lendable copies must be free, so a lone lendable
/// copy must itself be free.
pub fn can_be_borrowed(book: &Book) -> bool {
    let lendable = book
        .copies
        .iter()
        .filter(|copy| !copy.reading_room_only)
        .count();
    if lendable == 0 {
        return false;
    }

    let free = book
        .copies
        .iter()
        .filter(|copy| !copy.reading_room_only && !copy.lent)
        .count();

    free >= required_free_copies(lendable)
}

fn required_free_copies(lendable: usize) -> usize {
    (lendable * MIN_AVAILABLE_PERCENT).div_ceil(100)
}
